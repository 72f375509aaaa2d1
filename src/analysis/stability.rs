// StabilityTracker - asymmetric hysteresis counter
//
// The counter saturates at `capacity` and drops straight to zero on the first
// deviation above `delta`. "Stable" means `capacity` consecutive samples stayed
// within tolerance, so losing stability is instant while regaining it takes a
// full window.

/// Stable/Unstable classification derived from the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityState {
    Stable,
    Unstable,
}

#[derive(Debug, Clone)]
pub struct StabilityTracker {
    count: usize,
    capacity: usize,
    delta: f64,
}

impl StabilityTracker {
    /// Create a tracker that needs `capacity` in-tolerance samples to be stable
    pub fn new(capacity: usize, delta: f64) -> Self {
        Self {
            count: 0,
            capacity: capacity.max(1),
            delta,
        }
    }

    /// Feed one deviation; returns the updated counter
    pub fn observe(&mut self, deviation: f64) -> usize {
        if deviation.abs() > self.delta {
            self.count = 0;
        } else if self.count < self.capacity {
            self.count += 1;
        }
        self.count
    }

    /// Feed a set of per-axis deviations; any axis out of tolerance resets
    pub fn observe_all(&mut self, deviations: &[f64]) -> usize {
        // f64::max ignores NaN, so check it explicitly
        if deviations.iter().any(|d| d.is_nan()) {
            self.count = 0;
            return self.count;
        }
        let worst = deviations.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
        self.observe(worst)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }

    pub fn is_stable(&self) -> bool {
        self.count >= self.capacity
    }

    pub fn state(&self) -> StabilityState {
        if self.is_stable() {
            StabilityState::Stable
        } else {
            StabilityState::Unstable
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}
