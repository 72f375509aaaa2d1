// ReadingSmoother - generic single-axis smoothing pipeline
//
// Combines an optional FilterStrategy with a fixed-size circular buffer and a
// running sum, giving an O(1) trailing average regardless of window size, plus
// a stability counter over how far each new value sits from that average.
//
// Output selection:
// - no strategy: the trailing average (slow, stable view)
// - strategy:    the filtered value (fast view); the average still runs so the
//                stability bookkeeping stays current
//
// At 50 Hz a window of N samples adds N * 20 ms of latency to the average.

use crate::analysis::stability::StabilityTracker;
use crate::filter::strategy::FilterStrategy;

/// Default window size (500 ms at 50 Hz)
pub const DEFAULT_SAMPLES_COUNT: usize = 25;

/// Default stability tolerance: sin(0.5 deg) expressed in g
pub fn default_stability_delta() -> f64 {
    (0.5_f64).to_radians().sin()
}

#[derive(Debug, Clone)]
pub struct ReadingSmoother {
    strategy: Option<FilterStrategy>,
    buffer: Vec<f64>,
    sum: f64,
    index: usize,
    average: f64,
    last_output: f64,
    initialized: bool,
    stability: StabilityTracker,
}

impl ReadingSmoother {
    /// Create a smoother
    ///
    /// # Arguments
    /// * `strategy` - Filter applied before averaging, or `None` for pure averaging
    /// * `samples_count` - Window size N (values below 1 are clamped to 1)
    pub fn new(strategy: Option<FilterStrategy>, samples_count: usize) -> Self {
        let samples_count = samples_count.max(1);
        Self {
            strategy,
            buffer: vec![0.0; samples_count],
            sum: 0.0,
            index: 0,
            average: 0.0,
            last_output: 0.0,
            initialized: false,
            stability: StabilityTracker::new(samples_count, default_stability_delta()),
        }
    }

    /// Pure averaging smoother with the default window
    pub fn averaging() -> Self {
        Self::new(None, DEFAULT_SAMPLES_COUNT)
    }

    pub fn with_stability_delta(mut self, delta: f64) -> Self {
        self.stability.set_delta(delta);
        self
    }

    /// Push one raw value through the pipeline
    pub fn process_reading(&mut self, raw_value: f64) -> f64 {
        if !self.initialized {
            self.seed(raw_value);
        }

        let latest = match self.strategy {
            Some(strategy) => strategy.apply(raw_value, self.last_output),
            None => raw_value,
        };
        self.last_output = latest;

        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }

        self.sum += latest - self.buffer[self.index];
        self.buffer[self.index] = latest;
        self.average = self.sum / self.buffer.len() as f64;

        self.stability.observe(self.average - latest);

        if self.strategy.is_some() {
            latest
        } else {
            self.average
        }
    }

    /// Fill the whole window with the first value to avoid a cold-start ramp
    fn seed(&mut self, value: f64) {
        self.buffer.iter_mut().for_each(|slot| *slot = value);
        self.sum = value * self.buffer.len() as f64;
        self.average = value;
        self.last_output = value;
        self.initialized = true;
    }

    /// Forget all history; the next reading seeds the window again
    pub fn reset(&mut self) {
        self.buffer.iter_mut().for_each(|slot| *slot = 0.0);
        self.sum = 0.0;
        self.index = 0;
        self.average = 0.0;
        self.last_output = 0.0;
        self.initialized = false;
        self.stability.reset();
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    /// Running sum; always equals the sum of `buffer()`
    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    pub fn samples_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn strategy(&self) -> Option<FilterStrategy> {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: Option<FilterStrategy>) {
        self.strategy = strategy;
    }

    pub fn stability_delta(&self) -> f64 {
        self.stability.delta()
    }

    pub fn set_stability_delta(&mut self, delta: f64) {
        self.stability.set_delta(delta);
    }

    pub fn stable_count(&self) -> usize {
        self.stability.count()
    }

    pub fn is_stable(&self) -> bool {
        self.stability.is_stable()
    }
}

impl Default for ReadingSmoother {
    fn default() -> Self {
        Self::averaging()
    }
}

#[cfg(test)]
#[path = "smoother_tests.rs"]
mod tests;
