// ShakeDetector - dual-threshold edge detector over raw sample deltas
//
// A sample pair "shakes" when at least two of the three per-axis deltas exceed
// a threshold. An episode starts on the second consecutive qualifying pair
// (above `shake_threshold`) and ends once the motion drops below the lower
// `shake_end_threshold`. Between the two thresholds the state is held, so one
// sustained motion produces exactly one event.

use crate::error::ConfigError;
use crate::vector::Vector3;

pub const DEFAULT_SHAKE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_SHAKE_END_THRESHOLD: f64 = 0.2;

/// Emitted once per shake episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakeEvent {
    Started,
}

/// True iff at least two per-axis absolute deltas exceed `threshold`
pub fn is_shake(current: Vector3, previous: Vector3, threshold: f64) -> bool {
    let delta = (previous - current).abs();
    let over_x = delta.x > threshold;
    let over_y = delta.y > threshold;
    let over_z = delta.z > threshold;

    (over_x && over_y) || (over_x && over_z) || (over_y && over_z)
}

/// Reject thresholds outside the open interval (0, 1)
pub fn validate_threshold(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange {
            name: name.to_string(),
            value,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ShakeDetector {
    previous: Option<Vector3>,
    shaking: bool,
    consecutive_count: u32,
    shake_threshold: f64,
    shake_end_threshold: f64,
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self {
            previous: None,
            shaking: false,
            consecutive_count: 0,
            shake_threshold: DEFAULT_SHAKE_THRESHOLD,
            shake_end_threshold: DEFAULT_SHAKE_END_THRESHOLD,
        }
    }
}

impl ShakeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with validated thresholds
    pub fn with_thresholds(shake: f64, shake_end: f64) -> Result<Self, ConfigError> {
        let mut detector = Self::default();
        detector.set_shake_threshold(shake)?;
        detector.set_shake_end_threshold(shake_end)?;
        Ok(detector)
    }

    /// Forget the previous sample and episode state
    pub fn reset(&mut self) {
        self.previous = None;
        self.shaking = false;
        self.consecutive_count = 0;
    }

    pub fn is_shaking(&self) -> bool {
        self.shaking
    }

    pub fn consecutive_count(&self) -> u32 {
        self.consecutive_count
    }

    pub fn shake_threshold(&self) -> f64 {
        self.shake_threshold
    }

    pub fn shake_end_threshold(&self) -> f64 {
        self.shake_end_threshold
    }

    pub fn set_shake_threshold(&mut self, value: f64) -> Result<(), ConfigError> {
        validate_threshold("shake_threshold", value)?;
        self.shake_threshold = value;
        Ok(())
    }

    pub fn set_shake_end_threshold(&mut self, value: f64) -> Result<(), ConfigError> {
        validate_threshold("shake_end_threshold", value)?;
        self.shake_end_threshold = value;
        Ok(())
    }

    /// Process one raw sample; returns an event on the rising edge of an episode
    pub fn process(&mut self, current: Vector3) -> Option<ShakeEvent> {
        let previous = self.previous.replace(current)?;

        let shake_detected = is_shake(current, previous, self.shake_threshold);

        if shake_detected && !self.shaking && self.consecutive_count > 0 {
            self.shaking = true;
            self.consecutive_count = 0;
            tracing::debug!("[ShakeDetector] Shake episode started");
            Some(ShakeEvent::Started)
        } else if shake_detected {
            self.consecutive_count = self.consecutive_count.saturating_add(1);
            None
        } else {
            if !is_shake(current, previous, self.shake_end_threshold) {
                if self.shaking {
                    tracing::debug!("[ShakeDetector] Shake episode ended");
                }
                self.consecutive_count = 0;
                self.shaking = false;
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REST: Vector3 = Vector3::new(0.0, 0.0, -1.0);
    const SWING_A: Vector3 = Vector3::new(0.9, 0.9, -1.0);
    const SWING_B: Vector3 = Vector3::new(-0.9, -0.9, -1.0);

    fn run(detector: &mut ShakeDetector, samples: &[Vector3]) -> usize {
        samples
            .iter()
            .filter_map(|s| detector.process(*s))
            .count()
    }

    #[test]
    fn test_is_shake_needs_two_axes() {
        let prev = Vector3::ZERO;
        assert!(!is_shake(Vector3::new(0.8, 0.0, 0.0), prev, 0.7));
        assert!(is_shake(Vector3::new(0.8, 0.8, 0.0), prev, 0.7));
        assert!(is_shake(Vector3::new(0.8, 0.0, -0.8), prev, 0.7));
        assert!(is_shake(Vector3::new(0.0, -0.8, 0.8), prev, 0.7));
        // Exactly at the threshold does not count
        assert!(!is_shake(Vector3::new(0.7, 0.7, 0.0), prev, 0.7));
    }

    #[test]
    fn test_first_sample_never_triggers() {
        let mut detector = ShakeDetector::new();
        assert!(detector.process(SWING_A).is_none());
        assert_eq!(detector.consecutive_count(), 0);
    }

    #[test]
    fn test_single_qualifying_pair_only_arms() {
        let mut detector = ShakeDetector::new();
        assert_eq!(run(&mut detector, &[REST, SWING_A]), 0);
        assert_eq!(detector.consecutive_count(), 1);
        assert!(!detector.is_shaking());
    }

    #[test]
    fn test_one_event_per_episode() {
        let mut detector = ShakeDetector::new();
        // REST->A arms, A->B fires, then three more qualifying pairs
        let samples = [REST, SWING_A, SWING_B, SWING_A, SWING_B, SWING_A];
        assert_eq!(run(&mut detector, &samples), 1);
        assert!(detector.is_shaking());
    }

    #[test]
    fn test_second_episode_after_quiet() {
        let mut detector = ShakeDetector::new();
        let first = [REST, SWING_A, SWING_B, SWING_A];
        assert_eq!(run(&mut detector, &first), 1);

        // Motion below the end threshold closes the episode
        assert!(detector.process(SWING_A).is_none());
        assert!(!detector.is_shaking());
        assert_eq!(detector.consecutive_count(), 0);

        let second = [SWING_B, SWING_A];
        assert_eq!(run(&mut detector, &second), 1);
    }

    #[test]
    fn test_dead_zone_holds_state() {
        let mut detector = ShakeDetector::new();
        run(&mut detector, &[REST, SWING_A, SWING_B]);
        assert!(detector.is_shaking());

        // 0.5 deltas on two axes: below start, above end threshold
        let mid = Vector3::new(-0.4, -0.4, -1.0);
        assert!(detector.process(mid).is_none());
        assert!(detector.is_shaking());

        // Back up above start threshold: still the same episode
        assert!(detector.process(SWING_A).is_none());
        assert!(detector.is_shaking());
    }

    #[test]
    fn test_dead_zone_keeps_armed_count() {
        let mut detector = ShakeDetector::new();
        run(&mut detector, &[REST, SWING_A]);
        assert_eq!(detector.consecutive_count(), 1);

        let mid = Vector3::new(0.4, 0.4, -1.0);
        assert!(detector.process(mid).is_none());
        assert_eq!(detector.consecutive_count(), 1);

        // Next qualifying pair fires the edge
        assert_eq!(detector.process(SWING_B), Some(ShakeEvent::Started));
    }

    #[test]
    fn test_reset_disarms_and_needs_new_pair() {
        let mut detector = ShakeDetector::new();
        run(&mut detector, &[REST, SWING_A]);
        assert_eq!(detector.consecutive_count(), 1);

        detector.reset();
        assert_eq!(detector.consecutive_count(), 0);
        assert!(!detector.is_shaking());

        // First sample after a reset has no partner
        assert!(detector.process(SWING_B).is_none());
        assert!(detector.process(SWING_A).is_none());
        assert_eq!(detector.process(SWING_B), Some(ShakeEvent::Started));
    }

    #[test]
    fn test_threshold_validation() {
        let mut detector = ShakeDetector::new();
        assert!(detector.set_shake_threshold(0.0).is_err());
        assert!(detector.set_shake_threshold(1.0).is_err());
        assert!(detector.set_shake_end_threshold(-0.1).is_err());
        assert!(detector.set_shake_end_threshold(f64::NAN).is_err());
        assert_eq!(detector.shake_threshold(), DEFAULT_SHAKE_THRESHOLD);

        assert!(detector.set_shake_threshold(0.5).is_ok());
        assert_eq!(detector.shake_threshold(), 0.5);
        assert!(ShakeDetector::with_thresholds(0.6, 1.5).is_err());
    }
}
