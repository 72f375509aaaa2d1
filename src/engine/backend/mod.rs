//! Sensor source abstraction for the accelerometer pipeline.

use std::sync::Arc;

use crate::error::SensorError;
use crate::vector::Vector3;

/// Callback the sensor invokes for every sample: `(acceleration, timestamp_ms)`.
///
/// Runs on the sensor's own delivery context and must not block.
pub type SampleSink = Arc<dyn Fn(Vector3, u64) + Send + Sync>;

/// Trait implemented by platform-specific accelerometer backends.
///
/// The processor attaches exactly one sink per successful `start()` and the
/// backend must release it on `stop()`.
pub trait SensorSource: Send + Sync {
    /// Whether the device has an accelerometer at all.
    fn is_supported(&self) -> bool;
    fn start(&self, sink: SampleSink) -> Result<(), SensorError>;
    fn stop(&self) -> Result<(), SensorError>;
}

mod synthetic;
pub use synthetic::{SyntheticSensor, DEFAULT_SAMPLE_PERIOD_MS};
