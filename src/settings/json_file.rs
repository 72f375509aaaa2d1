use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::SettingsError;

use super::SettingsStore;

/// Settings persisted as a flat JSON object of numbers.
///
/// The whole file is loaded on open and rewritten on every `set_f64`, which is
/// fine for the handful of keys this crate writes.
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    values: RwLock<BTreeMap<String, f64>>,
}

impl JsonFileSettings {
    /// Open (or lazily create) a settings file.
    ///
    /// A missing file is treated as an empty store; a malformed file is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[Settings] {:?} not found, starting empty", path);
                BTreeMap::new()
            }
            Err(err) => {
                return Err(SettingsError::Io {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                })
            }
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, f64>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, json).map_err(|err| SettingsError::Io {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

impl SettingsStore for JsonFileSettings {
    fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(key).copied())
            .unwrap_or(default)
    }

    fn set_f64(&self, key: &str, value: f64) -> Result<(), SettingsError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| SettingsError::LockPoisoned)?;
        // Commit to memory only once the file holds the new value
        let mut updated = values.clone();
        updated.insert(key.to_string(), value);
        self.flush(&updated)?;
        *values = updated;
        Ok(())
    }
}
