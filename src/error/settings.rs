// Settings persistence error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Settings error code constants
///
/// Error code range: 3001-3003
pub struct SettingsErrorCodes {}

impl SettingsErrorCodes {
    pub const IO: i32 = 3001;
    pub const PARSE: i32 = 3002;
    pub const LOCK_POISONED: i32 = 3003;
}

/// Log a settings error with structured context
pub fn log_settings_error(err: &SettingsError, context: &str) {
    error!(
        "Settings error in {}: code={}, component=SettingsStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Reading or writing the backing file failed
    Io { path: String, reason: String },

    /// Backing file is not a flat JSON object of numbers
    Parse { reason: String },

    /// Settings lock was poisoned
    LockPoisoned,
}

impl ErrorCode for SettingsError {
    fn code(&self) -> i32 {
        match self {
            SettingsError::Io { .. } => SettingsErrorCodes::IO,
            SettingsError::Parse { .. } => SettingsErrorCodes::PARSE,
            SettingsError::LockPoisoned => SettingsErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            SettingsError::Io { path, reason } => {
                format!("Settings I/O failed for {}: {}", path, reason)
            }
            SettingsError::Parse { reason } => format!("Invalid settings file: {}", reason),
            SettingsError::LockPoisoned => "Settings lock poisoned".to_string(),
        }
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SettingsError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SettingsError {}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Parse {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_codes() {
        assert_eq!(
            SettingsError::Io {
                path: "/tmp/x".to_string(),
                reason: "denied".to_string()
            }
            .code(),
            SettingsErrorCodes::IO
        );
        assert_eq!(
            SettingsError::Parse {
                reason: "eof".to_string()
            }
            .code(),
            SettingsErrorCodes::PARSE
        );
        assert_eq!(SettingsError::LockPoisoned.code(), 3003);
    }

    #[test]
    fn test_from_serde_error() {
        let err: SettingsError = serde_json::from_str::<f64>("nope").unwrap_err().into();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
