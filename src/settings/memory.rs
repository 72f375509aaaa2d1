use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::SettingsError;

use super::SettingsStore;

/// Process-local settings, lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: RwLock<HashMap<String, f64>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a store, e.g. to simulate values from a previous run.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for InMemorySettings {
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
        values.insert(key.to_string(), value);
        Ok(())
    }
}
