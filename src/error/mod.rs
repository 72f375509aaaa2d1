// Error types for the accelerometer pipeline
//
// This module defines custom error types for sensor lifecycle, configuration
// and settings persistence, each carrying a stable numeric error code.

mod config;
mod sensor;
mod settings;

pub use config::{log_config_error, ConfigError, ConfigErrorCodes};
pub use sensor::{log_sensor_error, SensorError, SensorErrorCodes};
pub use settings::{log_settings_error, SettingsError, SettingsErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// embedding layers.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
