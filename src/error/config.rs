// Configuration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 2001-2003
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Processor built without a settings collaborator
    pub const MISSING_SETTINGS_STORE: i32 = 2001;

    /// Processor built without a sensor source
    pub const MISSING_SENSOR: i32 = 2002;

    /// Threshold outside its allowed range
    pub const THRESHOLD_OUT_OF_RANGE: i32 = 2003;
}

/// Log a configuration error with structured context
pub fn log_config_error(err: &ConfigError, context: &str) {
    error!(
        "Config error in {}: code={}, component=Configuration, message={}",
        context,
        err.code(),
        err.message()
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No settings store was supplied at construction
    MissingSettingsStore,

    /// No sensor source was supplied at construction
    MissingSensor,

    /// Threshold must lie in the open interval (0, 1)
    ThresholdOutOfRange { name: String, value: f64 },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::MissingSettingsStore => ConfigErrorCodes::MISSING_SETTINGS_STORE,
            ConfigError::MissingSensor => ConfigErrorCodes::MISSING_SENSOR,
            ConfigError::ThresholdOutOfRange { .. } => ConfigErrorCodes::THRESHOLD_OUT_OF_RANGE,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::MissingSettingsStore => "Settings store is required".to_string(),
            ConfigError::MissingSensor => "Sensor source is required".to_string(),
            ConfigError::ThresholdOutOfRange { name, value } => {
                format!("{} must be in (0, 1) (got {})", name, value)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::ThresholdOutOfRange {
            name: "shake_threshold".to_string(),
            value: 1.5,
        };
        assert_eq!(err.code(), 2003);
        assert_eq!(err.message(), "shake_threshold must be in (0, 1) (got 1.5)");
        assert!(ConfigError::MissingSettingsStore
            .message()
            .contains("Settings store"));
    }
}
