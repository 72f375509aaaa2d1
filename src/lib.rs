// Saber Accel Core - Rust Accelerometer Pipeline
// Real-time per-axis filtering, stability tracking, calibration and shake detection

// Module declarations
pub mod analysis;
pub mod calibration;
pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod filter;
pub mod managers;
pub mod settings;
pub mod vector;

// Re-exports for convenience
pub use analysis::{ShakeDetector, ShakeEvent, StabilityState, StabilityTracker};
pub use calibration::{CalibrationAxes, CalibrationStore};
pub use config::AppConfig;
pub use engine::{AccelerometerProcessor, ProcessorBuilder, Reading, SensorSource, SyntheticSensor};
pub use error::{ConfigError, ErrorCode, SensorError, SettingsError};
pub use filter::{AxisFilter, FilterStrategy, ReadingSmoother};
pub use managers::{ListenerId, SensorLifecycle};
pub use settings::{InMemorySettings, JsonFileSettings, SettingsStore};
pub use vector::Vector3;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_module_structure() {
        // Top-level re-exports are enough to assemble a working pipeline
        let processor = AccelerometerProcessor::with_defaults(
            Arc::new(SyntheticSensor::new()),
            Arc::new(InMemorySettings::new()),
        );
        assert!(processor.is_ok());
    }
}
