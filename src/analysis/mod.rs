// Analysis module - state machines evaluated on the filtered stream
//
// - stability: asymmetric hysteresis counter (instant loss, gradual regain)
// - shake: dual-threshold edge detector over raw sample deltas

pub mod shake;
pub mod stability;

pub use shake::{is_shake, ShakeDetector, ShakeEvent};
pub use stability::{StabilityState, StabilityTracker};
