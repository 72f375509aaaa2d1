// Axis selection and eligibility rules for calibration
//
// Each requested axis is judged on its own absolute average (sqrt(c^2)), never
// on a Euclidean combination of X and Y. A combined X|Y request resolves to the
// Y axis alone: only |y| is judged and only the Y offset is updated, X keeps
// its current offset. Z is never calibrated.

use bitflags::bitflags;

use crate::vector::Vector3;

bitflags! {
    /// Axes a calibration request applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CalibrationAxes: u8 {
        const X = 0b01;
        const Y = 0b10;
        const BOTH = Self::X.bits() | Self::Y.bits();
    }
}

impl CalibrationAxes {
    /// The axes actually judged and updated for this request
    pub fn resolved(self) -> Self {
        if self.contains(CalibrationAxes::Y) {
            CalibrationAxes::Y
        } else {
            self
        }
    }
}

/// Default maximum tilt at which an axis may still be calibrated (20 deg)
pub fn default_maximum_calibration_tilt_angle() -> f64 {
    20.0_f64.to_radians()
}

/// True iff every resolved axis of `average` is within `maximum_offset`
///
/// An empty axis set never qualifies.
pub fn within_calibration_bound(
    average: Vector3,
    axes: CalibrationAxes,
    maximum_offset: f64,
) -> bool {
    let axes = axes.resolved();
    if axes.is_empty() {
        return false;
    }

    let x_ok =
        !axes.contains(CalibrationAxes::X) || (average.x * average.x).sqrt() <= maximum_offset;
    let y_ok =
        !axes.contains(CalibrationAxes::Y) || (average.y * average.y).sqrt() <= maximum_offset;

    x_ok && y_ok
}

/// New offset after calibrating `axes` against `average`
///
/// Resolved axes become the negated average; other axes keep their current
/// offset. Z is always zero.
pub fn apply_offset_update(current: Vector3, average: Vector3, axes: CalibrationAxes) -> Vector3 {
    let axes = axes.resolved();
    Vector3::new(
        if axes.contains(CalibrationAxes::X) {
            -average.x
        } else {
            current.x
        },
        if axes.contains(CalibrationAxes::Y) {
            -average.y
        } else {
            current.y
        },
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound() -> f64 {
        default_maximum_calibration_tilt_angle().sin()
    }

    #[test]
    fn test_default_bound_is_sin_20_degrees() {
        assert!((bound() - 0.3420201433256687).abs() < 1e-12);
    }

    #[test]
    fn test_single_axis_ignores_other_axis() {
        // Y is far out of bounds but only X is requested
        let average = Vector3::new(0.1, 0.9, -0.4);
        assert!(within_calibration_bound(average, CalibrationAxes::X, bound()));
        assert!(!within_calibration_bound(average, CalibrationAxes::Y, bound()));
    }

    #[test]
    fn test_combined_request_judges_y_only() {
        // X far out of bounds, Y within: the combined request qualifies
        let average = Vector3::new(0.5, 0.1, -0.86);
        assert_eq!(CalibrationAxes::BOTH.resolved(), CalibrationAxes::Y);
        assert!(within_calibration_bound(average, CalibrationAxes::BOTH, bound()));

        // Y out of bounds fails it even with X level
        let average = Vector3::new(0.0, 0.5, -0.86);
        assert!(!within_calibration_bound(average, CalibrationAxes::BOTH, bound()));
    }

    #[test]
    fn test_single_axes_resolve_to_themselves() {
        assert_eq!(CalibrationAxes::X.resolved(), CalibrationAxes::X);
        assert_eq!(CalibrationAxes::Y.resolved(), CalibrationAxes::Y);
        assert!(CalibrationAxes::empty().resolved().is_empty());
    }

    #[test]
    fn test_empty_set_never_qualifies() {
        assert!(!within_calibration_bound(
            Vector3::ZERO,
            CalibrationAxes::empty(),
            bound()
        ));
    }

    #[test]
    fn test_offset_update_leaves_other_axis() {
        let current = Vector3::new(0.01, 0.02, 0.0);
        let average = Vector3::new(0.05, -0.04, -1.0);

        assert_eq!(
            apply_offset_update(current, average, CalibrationAxes::X),
            Vector3::new(-0.05, 0.02, 0.0)
        );
        assert_eq!(
            apply_offset_update(current, average, CalibrationAxes::Y),
            Vector3::new(0.01, 0.04, 0.0)
        );
        // Combined request updates Y only
        assert_eq!(
            apply_offset_update(current, average, CalibrationAxes::BOTH),
            Vector3::new(0.01, 0.04, 0.0)
        );
    }
}
