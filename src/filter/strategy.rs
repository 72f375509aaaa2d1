// FilterStrategy - single-axis filter applied sample by sample
//
// A strategy is stateless: the caller owns the previous output and passes it
// back in on every call. Three variants exist:
//
// 1. GatedExponential: exponential smoothing while the jump from the previous
//    output stays within the noise threshold, raw pass-through beyond it.
//    Suppresses jitter while tracking real motion with no lag.
// 2. Exponential: plain first-order low-pass.
// 3. Passthrough: returns the input unchanged.
//
// Cut-off frequency of the exponential stage: fc = fs * K / (2 * PI * (1 - K)).
// With K = 0.1 at a 50 Hz sensor rate this is roughly 1 Hz.

use serde::{Deserialize, Serialize};

/// Default smoothing coefficient (K)
pub const DEFAULT_COEFFICIENT: f64 = 0.1;

/// Noise threshold used for acceleration in g
pub const ACCELERATION_NOISE_THRESHOLD: f64 = 0.05;

/// Closed set of per-axis filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterStrategy {
    /// Exponential smoothing gated by a noise threshold
    GatedExponential {
        coefficient: f64,
        noise_threshold: f64,
    },
    /// First-order low-pass with no gating
    Exponential { coefficient: f64 },
    /// No filtering
    Passthrough,
}

impl Default for FilterStrategy {
    /// Generic smoother configuration: gating disabled
    fn default() -> Self {
        Self::GatedExponential {
            coefficient: DEFAULT_COEFFICIENT,
            noise_threshold: f64::INFINITY,
        }
    }
}

impl FilterStrategy {
    /// Noise-gated filter tuned for acceleration (K = 0.1, threshold = 0.05 g)
    pub fn optimal() -> Self {
        Self::GatedExponential {
            coefficient: DEFAULT_COEFFICIENT,
            noise_threshold: ACCELERATION_NOISE_THRESHOLD,
        }
    }

    /// Plain low-pass with the default coefficient
    pub fn low_pass() -> Self {
        Self::Exponential {
            coefficient: DEFAULT_COEFFICIENT,
        }
    }

    /// Compute the next output from a new input and the previous output
    pub fn apply(&self, new_input: f64, previous_output: f64) -> f64 {
        match *self {
            FilterStrategy::GatedExponential {
                coefficient,
                noise_threshold,
            } => {
                if (new_input - previous_output).abs() <= noise_threshold {
                    exponential(new_input, previous_output, coefficient)
                } else {
                    new_input
                }
            }
            FilterStrategy::Exponential { coefficient } => {
                exponential(new_input, previous_output, coefficient)
            }
            FilterStrategy::Passthrough => new_input,
        }
    }

    pub fn coefficient(&self) -> Option<f64> {
        match *self {
            FilterStrategy::GatedExponential { coefficient, .. }
            | FilterStrategy::Exponential { coefficient } => Some(coefficient),
            FilterStrategy::Passthrough => None,
        }
    }

    /// Replace the smoothing coefficient, keeping the variant
    pub fn with_coefficient(self, coefficient: f64) -> Self {
        match self {
            FilterStrategy::GatedExponential {
                noise_threshold, ..
            } => FilterStrategy::GatedExponential {
                coefficient,
                noise_threshold,
            },
            FilterStrategy::Exponential { .. } => FilterStrategy::Exponential { coefficient },
            FilterStrategy::Passthrough => FilterStrategy::Passthrough,
        }
    }

    /// Replace the noise threshold; only meaningful for the gated variant
    pub fn with_noise_threshold(self, noise_threshold: f64) -> Self {
        match self {
            FilterStrategy::GatedExponential { coefficient, .. } => {
                FilterStrategy::GatedExponential {
                    coefficient,
                    noise_threshold,
                }
            }
            other => other,
        }
    }
}

#[inline]
fn exponential(new_input: f64, previous_output: f64, coefficient: f64) -> f64 {
    previous_output + coefficient * (new_input - previous_output)
}

/// Single-axis filter that remembers its own previous output
///
/// The first input seeds the previous output so the filter starts settled
/// on the first value rather than ramping up from zero.
#[derive(Debug, Clone)]
pub struct AxisFilter {
    strategy: FilterStrategy,
    previous: Option<f64>,
}

impl AxisFilter {
    pub fn new(strategy: FilterStrategy) -> Self {
        Self {
            strategy,
            previous: None,
        }
    }

    pub fn process(&mut self, input: f64) -> f64 {
        let previous = self.previous.unwrap_or(input);
        let output = self.strategy.apply(input, previous);
        self.previous = Some(output);
        output
    }

    pub fn previous_output(&self) -> Option<f64> {
        self.previous
    }

    pub fn strategy(&self) -> FilterStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: FilterStrategy) {
        self.strategy = strategy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_gated_passes_large_jumps_through() {
        let filter = FilterStrategy::optimal();
        assert_eq!(filter.apply(0.5, 0.0), 0.5);
        assert_eq!(filter.apply(-1.0, 0.0), -1.0);
        // Just past the threshold
        assert_eq!(filter.apply(0.0500001, 0.0), 0.0500001);
    }

    #[test]
    fn test_gated_smooths_small_jumps() {
        let filter = FilterStrategy::optimal();
        let out = filter.apply(0.04, 0.0);
        assert!((out - 0.004).abs() < EPS);

        // Exactly at the threshold is still considered noise
        let out = filter.apply(0.05, 0.0);
        assert!((out - 0.005).abs() < EPS);
    }

    #[test]
    fn test_default_is_ungated_exponential() {
        let filter = FilterStrategy::default();
        let out = filter.apply(100.0, 0.0);
        assert!((out - 10.0).abs() < EPS);
    }

    #[test]
    fn test_exponential_and_passthrough() {
        let low_pass = FilterStrategy::low_pass();
        assert!((low_pass.apply(1.0, 0.0) - 0.1).abs() < EPS);
        assert_eq!(FilterStrategy::Passthrough.apply(3.5, 1.0), 3.5);
    }

    #[test]
    fn test_with_coefficient_keeps_variant() {
        let filter = FilterStrategy::optimal().with_coefficient(0.5);
        assert_eq!(
            filter,
            FilterStrategy::GatedExponential {
                coefficient: 0.5,
                noise_threshold: ACCELERATION_NOISE_THRESHOLD
            }
        );
        assert_eq!(
            FilterStrategy::Passthrough.with_noise_threshold(1.0),
            FilterStrategy::Passthrough
        );
    }

    #[test]
    fn test_axis_filter_seeds_from_first_input() {
        let mut filter = AxisFilter::new(FilterStrategy::low_pass());
        assert_eq!(filter.process(-1.0), -1.0);
        let second = filter.process(0.0);
        assert!((second - (-0.9)).abs() < EPS);
        assert_eq!(filter.previous_output(), Some(second));
    }
}
