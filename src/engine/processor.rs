// AccelerometerProcessor - orchestrates the per-sample pipeline
//
// Per axis, three views are derived from the same raw sample:
// - low-pass:  plain exponential filter (K = 0.1, ~1 Hz cut-off at 50 Hz)
// - optimal:   noise-gated exponential filter (K = 0.1, gate 0.05 g)
// - average:   trailing mean of the optimal output over N samples
//
// All filter state, device stability, the calibration offset and the shake
// detector live in one PipelineState behind one Mutex. The lock covers the
// compute portion only; listeners are notified after it is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::analysis::shake::{ShakeDetector, ShakeEvent};
use crate::analysis::stability::{StabilityState, StabilityTracker};
use crate::calibration::{
    apply_offset_update, within_calibration_bound, CalibrationAxes, CalibrationStore,
};
use crate::config::AppConfig;
use crate::debug::pipeline_tracer;
use crate::engine::backend::{SampleSink, SensorSource};
use crate::engine::reading::Reading;
use crate::error::{log_config_error, ConfigError, SensorError};
use crate::filter::{AxisFilter, FilterStrategy, ReadingSmoother};
use crate::managers::{BroadcastChannelManager, ListenerId, SensorLifecycle, SensorManager};
use crate::settings::SettingsStore;
use crate::vector::Vector3;

/// Filters for one axis, all fed from the same raw value
#[derive(Debug, Clone)]
struct AxisPipeline {
    low_pass: AxisFilter,
    optimal: AxisFilter,
    average: ReadingSmoother,
}

impl AxisPipeline {
    fn new(
        coefficient: f64,
        noise_threshold: f64,
        samples_count: usize,
        stability_delta: f64,
    ) -> Self {
        Self {
            low_pass: AxisFilter::new(FilterStrategy::Exponential { coefficient }),
            optimal: AxisFilter::new(FilterStrategy::GatedExponential {
                coefficient,
                noise_threshold,
            }),
            average: ReadingSmoother::new(None, samples_count)
                .with_stability_delta(stability_delta),
        }
    }

    /// Returns (low_pass, optimal, average)
    fn process(&mut self, raw: f64) -> (f64, f64, f64) {
        let low_pass = self.low_pass.process(raw);
        let optimal = self.optimal.process(raw);
        let average = self.average.process_reading(optimal);
        (low_pass, optimal, average)
    }
}

/// Everything guarded by the pipeline lock
#[derive(Debug)]
struct PipelineState {
    axes: [AxisPipeline; 3],
    device_stability: StabilityTracker,
    calibration_offset: Vector3,
    /// Uncalibrated trailing average of the last processed sample
    average: Vector3,
    low_pass_coefficient: f64,
    noise_threshold: f64,
    maximum_calibration_tilt_angle: f64,
    maximum_calibration_offset: f64,
    maximum_stability_tilt_delta_angle: f64,
    shake: ShakeDetector,
}

impl PipelineState {
    fn new(config: &AppConfig, calibration_offset: Vector3) -> Result<Self, ConfigError> {
        let filter = &config.filter;
        let samples_count = filter.samples_count.max(1);
        let stability_delta = config.stability.maximum_stability_delta_offset();
        let axis = AxisPipeline::new(
            filter.low_pass_coefficient,
            filter.noise_threshold,
            samples_count,
            stability_delta,
        );

        Ok(Self {
            axes: [axis.clone(), axis.clone(), axis],
            device_stability: StabilityTracker::new(samples_count, stability_delta),
            calibration_offset,
            average: Vector3::ZERO,
            low_pass_coefficient: filter.low_pass_coefficient,
            noise_threshold: filter.noise_threshold,
            maximum_calibration_tilt_angle: config
                .stability
                .maximum_calibration_tilt_angle_deg
                .to_radians(),
            maximum_calibration_offset: config.stability.maximum_calibration_offset(),
            maximum_stability_tilt_delta_angle: config
                .stability
                .maximum_stability_tilt_delta_angle_deg
                .to_radians(),
            shake: ShakeDetector::with_thresholds(
                config.shake.shake_threshold,
                config.shake.shake_end_threshold,
            )?,
        })
    }

    /// Run one raw sample through every pipeline
    fn step(&mut self, raw: Vector3, timestamp_ms: u64) -> (Reading, Option<ShakeEvent>) {
        pipeline_tracer::trace_sample(raw, timestamp_ms);

        let mut low_pass = [0.0; 3];
        let mut optimal = [0.0; 3];
        let mut average = [0.0; 3];
        for (i, value) in raw.to_array().into_iter().enumerate() {
            (low_pass[i], optimal[i], average[i]) = self.axes[i].process(value);
        }
        let low_pass = Vector3::from(low_pass);
        let optimal = Vector3::from(optimal);
        let average = Vector3::from(average);

        pipeline_tracer::trace_filtered(low_pass, optimal);
        pipeline_tracer::trace_average(average);

        let deviation = (average - optimal).to_array();
        let count = self.device_stability.observe_all(&deviation);
        pipeline_tracer::trace_stability(
            count,
            self.device_stability.capacity(),
            (average - optimal).max_abs_component(),
        );

        self.average = average;

        let offset = self.calibration_offset;
        let reading = Reading::new(
            timestamp_ms,
            raw + offset,
            optimal + offset,
            low_pass + offset,
            average + offset,
        );

        let shake = self.shake.process(raw);
        (reading, shake)
    }

    fn is_device_stable(&self) -> bool {
        self.device_stability.is_stable()
    }

    fn can_calibrate(&self, axes: CalibrationAxes) -> bool {
        self.is_device_stable()
            && within_calibration_bound(self.average, axes, self.maximum_calibration_offset)
    }

    fn set_filter_strategies(&mut self) {
        let coefficient = self.low_pass_coefficient;
        let noise_threshold = self.noise_threshold;
        for axis in &mut self.axes {
            axis.low_pass.set_strategy(FilterStrategy::Exponential { coefficient });
            axis.optimal.set_strategy(FilterStrategy::GatedExponential {
                coefficient,
                noise_threshold,
            });
        }
    }
}

/// State shared with the sensor sink
struct ProcessorShared {
    pipeline: Mutex<PipelineState>,
    latest: RwLock<Option<Arc<Reading>>>,
    listeners: BroadcastChannelManager,
    calibration_store: CalibrationStore,
    /// Serializes settings writes; always taken before the pipeline lock
    persist: Mutex<()>,
}

impl ProcessorShared {
    /// Poisoning is recovered; listeners never run under this lock
    fn lock_pipeline(&self) -> MutexGuard<'_, PipelineState> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn process_sample(&self, raw: Vector3, timestamp_ms: u64) -> Arc<Reading> {
        let (reading, shake) = {
            let mut pipeline = self.lock_pipeline();
            pipeline.step(raw, timestamp_ms)
        };
        let reading = Arc::new(reading);

        {
            let mut latest = self
                .latest
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *latest = Some(Arc::clone(&reading));
        }

        let listeners = self.listeners.publish_reading(&reading);
        pipeline_tracer::trace_reading_published(timestamp_ms, listeners);

        if let Some(event) = shake {
            log::debug!("[AccelerometerProcessor] Shake detected at {} ms", timestamp_ms);
            pipeline_tracer::trace_shake(timestamp_ms);
            self.listeners.publish_shake(event);
        }

        reading
    }
}

/// Real-time accelerometer pipeline
///
/// Construct with [`ProcessorBuilder`]. Samples arrive through the sensor
/// sink after [`start`](Self::start), or directly through
/// [`process_sample`](Self::process_sample).
pub struct AccelerometerProcessor {
    shared: Arc<ProcessorShared>,
    sensor: SensorManager,
    device_supports_accelerometer: bool,
}

impl AccelerometerProcessor {
    /// Build a processor with the default configuration
    pub fn with_defaults(
        sensor: Arc<dyn SensorSource>,
        settings: Arc<dyn SettingsStore>,
    ) -> Result<Self, ConfigError> {
        ProcessorBuilder::new()
            .sensor(sensor)
            .settings(settings)
            .build()
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Subscribe to the sensor; a no-op when already running
    ///
    /// # Errors
    /// Returns the sensor's error (e.g. `NotSupported`). The processor stays
    /// usable and idle, and `start` may be retried.
    pub fn start(&self) -> Result<(), SensorError> {
        let weak = Arc::downgrade(&self.shared);
        let sink: SampleSink = Arc::new(move |raw, timestamp_ms| {
            if let Some(shared) = weak.upgrade() {
                shared.process_sample(raw, timestamp_ms);
            }
        });
        self.sensor.start(sink)
    }

    /// Release the sensor subscription; a no-op when not running
    ///
    /// A real stop breaks the sample chain, so the shake detector forgets
    /// its previous sample and episode state.
    pub fn stop(&self) -> Result<(), SensorError> {
        let was_running = self.sensor.is_running();
        self.sensor.stop()?;
        if was_running {
            self.shared.lock_pipeline().shake.reset();
        }
        Ok(())
    }

    pub fn lifecycle(&self) -> SensorLifecycle {
        self.sensor.lifecycle()
    }

    pub fn device_supports_accelerometer(&self) -> bool {
        self.device_supports_accelerometer
    }

    // ========================================================================
    // HOT PATH
    // ========================================================================

    /// Process one raw sample and notify listeners
    ///
    /// Listeners run on the calling thread after the pipeline lock is
    /// released: readings first, then a shake event if one started.
    pub fn process_sample(&self, raw: Vector3, timestamp_ms: u64) -> Arc<Reading> {
        self.shared.process_sample(raw, timestamp_ms)
    }

    /// Latest published reading, if any sample has been processed
    pub fn reading(&self) -> Option<Arc<Reading>> {
        self.shared
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ========================================================================
    // STABILITY & CALIBRATION
    // ========================================================================

    pub fn is_device_stable(&self) -> bool {
        self.shared.lock_pipeline().is_device_stable()
    }

    pub fn stability_state(&self) -> StabilityState {
        self.shared.lock_pipeline().device_stability.state()
    }

    pub fn stable_count(&self) -> usize {
        self.shared.lock_pipeline().device_stability.count()
    }

    pub fn samples_count(&self) -> usize {
        self.shared.lock_pipeline().device_stability.capacity()
    }

    /// Trailing average before calibration is applied
    pub fn average_acceleration(&self) -> Vector3 {
        self.shared.lock_pipeline().average
    }

    pub fn calibration_offset(&self) -> Vector3 {
        self.shared.lock_pipeline().calibration_offset
    }

    /// Whether `axes` may be calibrated right now
    ///
    /// Requires full device stability and every requested axis of the
    /// average within sin(maximum calibration tilt).
    pub fn can_calibrate(&self, axes: CalibrationAxes) -> bool {
        self.shared.lock_pipeline().can_calibrate(axes)
    }

    /// Zero the current tilt on `axes`
    ///
    /// Returns false and leaves state untouched when calibration is not
    /// possible. The offset is applied under the pipeline lock and persisted
    /// after it is released, so the sensor callback never waits on settings
    /// I/O. A persistence failure is logged; the in-memory offset is still
    /// updated and the call returns true.
    pub fn calibrate(&self, axes: CalibrationAxes) -> bool {
        let label = format!("{:?}", axes);
        let _persist = self
            .shared
            .persist
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let offset = {
            let mut pipeline = self.shared.lock_pipeline();
            if !pipeline.can_calibrate(axes) {
                pipeline_tracer::trace_calibration(&label, false, pipeline.calibration_offset);
                return false;
            }

            let offset = apply_offset_update(pipeline.calibration_offset, pipeline.average, axes);
            pipeline.calibration_offset = offset;
            offset
        };

        let _ = self.shared.calibration_store.set(offset);

        log::info!("[AccelerometerProcessor] Calibrated {} -> offset {}", label, offset);
        pipeline_tracer::trace_calibration(&label, true, offset);
        true
    }

    /// Parameterless eligibility check; the combined request judges Y only
    pub fn can_calibrate_xy(&self) -> bool {
        self.can_calibrate(CalibrationAxes::BOTH)
    }

    /// Parameterless calibration; updates the Y offset only, X is kept
    pub fn calibrate_xy(&self) -> bool {
        self.calibrate(CalibrationAxes::BOTH)
    }

    // ========================================================================
    // TUNING
    // ========================================================================

    pub fn low_pass_coefficient(&self) -> f64 {
        self.shared.lock_pipeline().low_pass_coefficient
    }

    /// Smoothing factor K for both the low-pass and optimal filters
    pub fn set_low_pass_coefficient(&self, coefficient: f64) {
        let mut pipeline = self.shared.lock_pipeline();
        pipeline.low_pass_coefficient = coefficient;
        pipeline.set_filter_strategies();
    }

    pub fn noise_threshold(&self) -> f64 {
        self.shared.lock_pipeline().noise_threshold
    }

    pub fn set_noise_threshold(&self, noise_threshold: f64) {
        let mut pipeline = self.shared.lock_pipeline();
        pipeline.noise_threshold = noise_threshold;
        pipeline.set_filter_strategies();
    }

    /// Maximum calibration tilt in radians
    pub fn maximum_calibration_tilt_angle(&self) -> f64 {
        self.shared.lock_pipeline().maximum_calibration_tilt_angle
    }

    pub fn set_maximum_calibration_tilt_angle(&self, radians: f64) {
        let mut pipeline = self.shared.lock_pipeline();
        pipeline.maximum_calibration_tilt_angle = radians;
        pipeline.maximum_calibration_offset = radians.sin();
    }

    pub fn maximum_calibration_offset(&self) -> f64 {
        self.shared.lock_pipeline().maximum_calibration_offset
    }

    /// Maximum stability tilt delta in radians
    pub fn maximum_stability_tilt_delta_angle(&self) -> f64 {
        self.shared.lock_pipeline().maximum_stability_tilt_delta_angle
    }

    pub fn set_maximum_stability_tilt_delta_angle(&self, radians: f64) {
        let mut pipeline = self.shared.lock_pipeline();
        let delta = radians.sin();
        pipeline.maximum_stability_tilt_delta_angle = radians;
        pipeline.device_stability.set_delta(delta);
        for axis in &mut pipeline.axes {
            axis.average.set_stability_delta(delta);
        }
    }

    pub fn maximum_stability_delta_offset(&self) -> f64 {
        self.shared.lock_pipeline().device_stability.delta()
    }

    pub fn shake_threshold(&self) -> f64 {
        self.shared.lock_pipeline().shake.shake_threshold()
    }

    /// # Errors
    /// `ThresholdOutOfRange` unless `value` is in (0, 1)
    pub fn set_shake_threshold(&self, value: f64) -> Result<(), ConfigError> {
        self.shared
            .lock_pipeline()
            .shake
            .set_shake_threshold(value)
            .inspect_err(|err| log_config_error(err, "set_shake_threshold"))
    }

    pub fn shake_end_threshold(&self) -> f64 {
        self.shared.lock_pipeline().shake.shake_end_threshold()
    }

    /// # Errors
    /// `ThresholdOutOfRange` unless `value` is in (0, 1)
    pub fn set_shake_end_threshold(&self, value: f64) -> Result<(), ConfigError> {
        self.shared
            .lock_pipeline()
            .shake
            .set_shake_end_threshold(value)
            .inspect_err(|err| log_config_error(err, "set_shake_end_threshold"))
    }

    // ========================================================================
    // LISTENERS
    // ========================================================================

    /// Register a callback for every published reading
    pub fn on_reading<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Arc<Reading>) + Send + Sync + 'static,
    {
        self.shared.listeners.on_reading(listener)
    }

    /// Register a callback for every shake episode
    pub fn on_shake<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.listeners.on_shake(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove_listener(id)
    }

    pub fn subscribe_readings(&self) -> broadcast::Receiver<Arc<Reading>> {
        self.shared.listeners.subscribe_readings()
    }

    pub fn subscribe_shakes(&self) -> broadcast::Receiver<ShakeEvent> {
        self.shared.listeners.subscribe_shakes()
    }
}

impl Drop for AccelerometerProcessor {
    fn drop(&mut self) {
        let _ = self.sensor.stop();
    }
}

/// Builder for [`AccelerometerProcessor`]
///
/// # Example
/// ```ignore
/// let processor = ProcessorBuilder::new()
///     .sensor(Arc::new(SyntheticSensor::new()))
///     .settings(Arc::new(InMemorySettings::new()))
///     .config(AppConfig::load_from_file("accel.json"))
///     .build()?;
/// ```
#[derive(Default)]
pub struct ProcessorBuilder {
    sensor: Option<Arc<dyn SensorSource>>,
    settings: Option<Arc<dyn SettingsStore>>,
    config: AppConfig,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensor(mut self, sensor: Arc<dyn SensorSource>) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration and load the persisted calibration offset
    ///
    /// # Errors
    /// - `MissingSettingsStore` / `MissingSensor` when a collaborator is absent
    /// - `ThresholdOutOfRange` for invalid shake thresholds
    pub fn build(self) -> Result<AccelerometerProcessor, ConfigError> {
        let settings = self
            .settings
            .ok_or(ConfigError::MissingSettingsStore)
            .inspect_err(|err| log_config_error(err, "build"))?;
        let sensor = self
            .sensor
            .ok_or(ConfigError::MissingSensor)
            .inspect_err(|err| log_config_error(err, "build"))?;

        self.config
            .validate()
            .inspect_err(|err| log_config_error(err, "build"))?;

        pipeline_tracer::init();

        let calibration_store = CalibrationStore::new(settings);
        let calibration_offset = calibration_store.get();
        let pipeline = PipelineState::new(&self.config, calibration_offset)?;
        let device_supports_accelerometer = sensor.is_supported();

        log::info!(
            "[AccelerometerProcessor] Created (samples={}, offset={}, supported={})",
            pipeline.device_stability.capacity(),
            calibration_offset,
            device_supports_accelerometer
        );

        Ok(AccelerometerProcessor {
            shared: Arc::new(ProcessorShared {
                pipeline: Mutex::new(pipeline),
                latest: RwLock::new(None),
                listeners: BroadcastChannelManager::new(),
                calibration_store,
                persist: Mutex::new(()),
            }),
            sensor: SensorManager::new(sensor),
            device_supports_accelerometer,
        })
    }
}
