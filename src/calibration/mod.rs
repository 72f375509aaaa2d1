// Calibration module - tilt offset for the X and Y axes
//
// This module provides two main components:
// 1. CalibrationAxes + eligibility rules: which axes may be zeroed given the
//    current stable average
// 2. CalibrationStore: persistence of the two offsets through the settings
//    collaborator
//
// The calibration workflow:
// 1. Device rests (near level) until the processor reports it stable
// 2. can_calibrate(axes) checks the per-axis tilt bound
// 3. calibrate(axes) negates the average on the requested axes and persists

pub mod axes;
pub mod store;

pub use axes::{apply_offset_update, within_calibration_bound, CalibrationAxes};
pub use store::{CalibrationStore, CALIBRATION_SETTING_KEY};
