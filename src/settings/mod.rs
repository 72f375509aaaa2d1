//! Key/value settings collaborator.
//!
//! The pipeline only ever stores two scalar calibration offsets, so the
//! contract is deliberately narrow: floating point values addressed by string
//! keys, read with a default and written synchronously.

use crate::error::SettingsError;

mod json_file;
mod memory;

pub use json_file::JsonFileSettings;
pub use memory::InMemorySettings;

/// Trait implemented by persistent (or in-memory) settings backends.
pub trait SettingsStore: Send + Sync {
    /// Read `key`, falling back to `default` when absent.
    fn get_f64(&self, key: &str, default: f64) -> f64;

    /// Store `value` under `key`.
    fn set_f64(&self, key: &str, value: f64) -> Result<(), SettingsError>;
}
