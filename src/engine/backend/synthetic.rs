use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::SensorError;
use crate::vector::Vector3;

use super::{SampleSink, SensorSource};

/// 50 Hz sensor rate
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 20;

/// Sensor driven by the caller, used for deterministic testing and CLI replay.
///
/// Samples pushed while the sensor is stopped are dropped, just like a real
/// device that is not reporting.
pub struct SyntheticSensor {
    supported: bool,
    running: AtomicBool,
    sink: Mutex<Option<SampleSink>>,
    period_ms: u64,
    next_timestamp_ms: AtomicU64,
    start_count: AtomicU64,
    stop_count: AtomicU64,
}

impl SyntheticSensor {
    pub fn new() -> Self {
        Self::with_support(true)
    }

    /// A device without an accelerometer: every start fails.
    pub fn unsupported() -> Self {
        Self::with_support(false)
    }

    fn with_support(supported: bool) -> Self {
        Self {
            supported,
            running: AtomicBool::new(false),
            sink: Mutex::new(None),
            period_ms: DEFAULT_SAMPLE_PERIOD_MS,
            next_timestamp_ms: AtomicU64::new(0),
            start_count: AtomicU64::new(0),
            stop_count: AtomicU64::new(0),
        }
    }

    pub fn with_period_ms(mut self, period_ms: u64) -> Self {
        self.period_ms = period_ms.max(1);
        self
    }

    /// Deliver a sample stamped with the internal clock.
    ///
    /// Returns false when the sensor is not running.
    pub fn push(&self, acceleration: Vector3) -> bool {
        let timestamp_ms = self
            .next_timestamp_ms
            .fetch_add(self.period_ms, Ordering::SeqCst);
        self.push_at(acceleration, timestamp_ms)
    }

    /// Deliver a sample with an explicit timestamp.
    pub fn push_at(&self, acceleration: Vector3, timestamp_ms: u64) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }

        // Clone out so the sink runs without holding our lock
        let sink = match self.sink.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return false,
        };

        match sink {
            Some(sink) => {
                sink(acceleration, timestamp_ms);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of successful `start()` calls
    pub fn start_count(&self) -> u64 {
        self.start_count.load(Ordering::SeqCst)
    }

    /// Number of successful `stop()` calls
    pub fn stop_count(&self) -> u64 {
        self.stop_count.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SyntheticSensor {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&self, sink: SampleSink) -> Result<(), SensorError> {
        if !self.supported {
            return Err(SensorError::NotSupported);
        }

        let mut guard = self.sink.lock().map_err(|_| SensorError::LockPoisoned {
            component: "synthetic_sensor".to_string(),
        })?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SensorError::StartFailed {
                reason: "sensor already running".to_string(),
            });
        }

        *guard = Some(sink);
        self.start_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), SensorError> {
        let mut guard = self.sink.lock().map_err(|_| SensorError::LockPoisoned {
            component: "synthetic_sensor".to_string(),
        })?;

        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(SensorError::StopFailed {
                reason: "sensor not running".to_string(),
            });
        }

        *guard = None;
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_push_requires_running() {
        let sensor = SyntheticSensor::new();
        assert!(!sensor.push(Vector3::ZERO));
    }

    #[test]
    fn test_samples_reach_sink_with_clock() {
        let sensor = SyntheticSensor::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        sensor
            .start(Arc::new(move |v, ts| sink_seen.lock().unwrap().push((v, ts))))
            .unwrap();

        assert!(sensor.push(Vector3::new(0.0, 0.0, -1.0)));
        assert!(sensor.push(Vector3::new(0.1, 0.0, -1.0)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, 0);
        assert_eq!(seen[1].1, DEFAULT_SAMPLE_PERIOD_MS);
    }

    #[test]
    fn test_double_start_and_stop_are_errors() {
        let sensor = SyntheticSensor::new();
        sensor.start(Arc::new(|_, _| {})).unwrap();
        assert!(matches!(
            sensor.start(Arc::new(|_, _| {})),
            Err(SensorError::StartFailed { .. })
        ));
        sensor.stop().unwrap();
        assert!(matches!(sensor.stop(), Err(SensorError::StopFailed { .. })));
        assert_eq!(sensor.start_count(), 1);
        assert_eq!(sensor.stop_count(), 1);
    }

    #[test]
    fn test_unsupported_start_fails() {
        let sensor = SyntheticSensor::unsupported();
        assert!(!sensor.is_supported());
        assert_eq!(
            sensor.start(Arc::new(|_, _| {})),
            Err(SensorError::NotSupported)
        );
    }
}
