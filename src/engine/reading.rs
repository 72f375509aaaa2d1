//! Composite reading published once per processed sample.

use serde::{Deserialize, Serialize};

use crate::vector::Vector3;

/// All filtered views of one sample, calibration already applied.
///
/// A reading is never mutated after construction; the next sample produces a
/// new one. Listeners receive it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sensor timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Unfiltered sensor value, for rapidly reacting UI
    pub raw_acceleration: Vector3,
    /// Noise-gated low-pass: low noise, near-zero latency on large moves
    pub optimally_filtered_acceleration: Vector3,
    /// 1 Hz first-order low-pass: smooth, medium latency
    pub low_pass_filtered_acceleration: Vector3,
    /// Trailing mean of the optimal output: very stable, high latency
    pub average_acceleration: Vector3,
}

impl Reading {
    pub fn new(
        timestamp_ms: u64,
        raw_acceleration: Vector3,
        optimally_filtered_acceleration: Vector3,
        low_pass_filtered_acceleration: Vector3,
        average_acceleration: Vector3,
    ) -> Self {
        Self {
            timestamp_ms,
            raw_acceleration,
            optimally_filtered_acceleration,
            low_pass_filtered_acceleration,
            average_acceleration,
        }
    }
}
