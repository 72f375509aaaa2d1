// Filter module - single-axis filters and the reusable smoothing pipeline
//
// - strategy: stateless filter variants plus AxisFilter (previous-output state)
// - smoother: circular-buffer running average with stability bookkeeping

pub mod smoother;
pub mod strategy;

pub use smoother::{default_stability_delta, ReadingSmoother, DEFAULT_SAMPLES_COUNT};
pub use strategy::{AxisFilter, FilterStrategy, ACCELERATION_NOISE_THRESHOLD, DEFAULT_COEFFICIENT};
