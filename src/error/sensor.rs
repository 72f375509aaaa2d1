// Sensor lifecycle error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Sensor error code constants
///
/// Error code range: 1001-1004
pub struct SensorErrorCodes {}

impl SensorErrorCodes {
    /// Device has no accelerometer
    pub const NOT_SUPPORTED: i32 = 1001;

    /// Sensor subscription could not be started
    pub const START_FAILED: i32 = 1002;

    /// Sensor subscription could not be released
    pub const STOP_FAILED: i32 = 1003;

    /// Lifecycle lock was poisoned
    pub const LOCK_POISONED: i32 = 1004;
}

/// Log a sensor error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_sensor_error(err: &SensorError, context: &str) {
    error!(
        "Sensor error in {}: code={}, component=SensorSource, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Sensor-related errors
///
/// Start failures are non-fatal: the processor stays usable but idle and the
/// caller decides whether to retry.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorError {
    /// Device lacks an accelerometer
    NotSupported,

    /// Sensor refused to start
    StartFailed { reason: String },

    /// Sensor refused to stop
    StopFailed { reason: String },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for SensorError {
    fn code(&self) -> i32 {
        match self {
            SensorError::NotSupported => SensorErrorCodes::NOT_SUPPORTED,
            SensorError::StartFailed { .. } => SensorErrorCodes::START_FAILED,
            SensorError::StopFailed { .. } => SensorErrorCodes::STOP_FAILED,
            SensorError::LockPoisoned { .. } => SensorErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            SensorError::NotSupported => {
                "Accelerometer not supported on this device".to_string()
            }
            SensorError::StartFailed { reason } => {
                format!("Failed to start accelerometer: {}", reason)
            }
            SensorError::StopFailed { reason } => {
                format!("Failed to stop accelerometer: {}", reason)
            }
            SensorError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SensorError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SensorError {}
