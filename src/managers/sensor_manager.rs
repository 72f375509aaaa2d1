// SensorManager: Focused manager for the sensor subscription lifecycle
//
// Single Responsibility: toggle the (expensive) sensor subscription exactly
// once per start/stop, with repeat calls being no-ops.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::backend::{SampleSink, SensorSource};
use crate::error::{log_sensor_error, SensorError};

/// Lifecycle of the sensor subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorLifecycle {
    /// Not subscribed
    Idle,
    /// Subscribed and delivering samples
    Running,
    /// Last start attempt failed; usable but idle, start may be retried
    Failed,
}

/// Manages the sensor subscription
///
/// All transitions happen under one lock, so concurrent start/start or
/// stop/stop pairs toggle the sensor once and the loser observes a no-op.
///
/// # Example
/// ```ignore
/// let manager = SensorManager::new(sensor);
/// manager.start(sink)?;
/// manager.start(other_sink)?; // no-op, already running
/// manager.stop()?;
/// ```
pub struct SensorManager {
    sensor: Arc<dyn SensorSource>,
    lifecycle: Mutex<SensorLifecycle>,
}

impl SensorManager {
    pub fn new(sensor: Arc<dyn SensorSource>) -> Self {
        Self {
            sensor,
            lifecycle: Mutex::new(SensorLifecycle::Idle),
        }
    }

    /// Subscribe `sink` to the sensor unless already running
    ///
    /// # Errors
    /// - `NotSupported` / `StartFailed` from the sensor (lifecycle becomes `Failed`)
    /// - Lock poisoning
    pub fn start(&self, sink: SampleSink) -> Result<(), SensorError> {
        let mut guard = self.lock_lifecycle()?;

        if *guard == SensorLifecycle::Running {
            return Ok(());
        }

        match self.sensor.start(sink) {
            Ok(()) => {
                *guard = SensorLifecycle::Running;
                log::info!("[SensorManager] Accelerometer started");
                Ok(())
            }
            Err(err) => {
                *guard = SensorLifecycle::Failed;
                log_sensor_error(&err, "start");
                Err(err)
            }
        }
    }

    /// Release the sensor subscription if running
    ///
    /// Safe to call when not running. On a stop failure the lifecycle stays
    /// `Running` so the caller can retry.
    pub fn stop(&self) -> Result<(), SensorError> {
        let mut guard = self.lock_lifecycle()?;

        if *guard != SensorLifecycle::Running {
            *guard = SensorLifecycle::Idle;
            return Ok(());
        }

        self.sensor.stop().inspect_err(|err| {
            log_sensor_error(err, "stop");
        })?;

        *guard = SensorLifecycle::Idle;
        log::info!("[SensorManager] Accelerometer stopped");
        Ok(())
    }

    pub fn lifecycle(&self) -> SensorLifecycle {
        match self.lifecycle.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle() == SensorLifecycle::Running
    }

    pub fn is_supported(&self) -> bool {
        self.sensor.is_supported()
    }

    fn lock_lifecycle(&self) -> Result<MutexGuard<'_, SensorLifecycle>, SensorError> {
        self.lifecycle.lock().map_err(|_| SensorError::LockPoisoned {
            component: "sensor_lifecycle".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backend::SyntheticSensor;
    use std::thread;

    fn noop_sink() -> SampleSink {
        Arc::new(|_, _| {})
    }

    #[test]
    fn test_start_stop_are_idempotent() {
        let sensor = Arc::new(SyntheticSensor::new());
        let manager = SensorManager::new(sensor.clone());

        manager.start(noop_sink()).unwrap();
        manager.start(noop_sink()).unwrap();
        assert_eq!(manager.lifecycle(), SensorLifecycle::Running);
        assert_eq!(sensor.start_count(), 1);

        manager.stop().unwrap();
        manager.stop().unwrap();
        assert_eq!(manager.lifecycle(), SensorLifecycle::Idle);
        assert_eq!(sensor.stop_count(), 1);
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let sensor = Arc::new(SyntheticSensor::new());
        let manager = SensorManager::new(sensor.clone());
        assert!(manager.stop().is_ok());
        assert_eq!(sensor.stop_count(), 0);
    }

    #[test]
    fn test_unsupported_start_marks_failed() {
        let manager = SensorManager::new(Arc::new(SyntheticSensor::unsupported()));
        assert_eq!(manager.start(noop_sink()), Err(SensorError::NotSupported));
        assert_eq!(manager.lifecycle(), SensorLifecycle::Failed);
        assert!(!manager.is_supported());

        // Failed -> Idle on stop, without touching the sensor
        assert!(manager.stop().is_ok());
        assert_eq!(manager.lifecycle(), SensorLifecycle::Idle);
    }

    #[test]
    fn test_concurrent_starts_toggle_once() {
        let sensor = Arc::new(SyntheticSensor::new());
        let manager = Arc::new(SensorManager::new(sensor.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.start(noop_sink()))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert_eq!(sensor.start_count(), 1);
    }
}
