// CalibrationStore - persistence of the X/Y calibration offset
//
// Thin adapter over the settings collaborator: two scalar keys, read once at
// construction and written on each successful calibration. The current offset
// itself is held by the processor, not cached here.

use std::sync::Arc;

use crate::error::{log_settings_error, SettingsError};
use crate::settings::SettingsStore;
use crate::vector::Vector3;

/// Key prefix; the stored keys are `<prefix>X` and `<prefix>Y`
pub const CALIBRATION_SETTING_KEY: &str = "AccelerometerCalibration";

#[derive(Clone)]
pub struct CalibrationStore {
    settings: Arc<dyn SettingsStore>,
}

impl CalibrationStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    fn key(axis: &str) -> String {
        format!("{}{}", CALIBRATION_SETTING_KEY, axis)
    }

    /// Load the persisted offset; missing keys read as 0 and Z is always 0
    pub fn get(&self) -> Vector3 {
        let x = self.settings.get_f64(&Self::key("X"), 0.0);
        let y = self.settings.get_f64(&Self::key("Y"), 0.0);
        Vector3::new(x, y, 0.0)
    }

    /// Persist both offsets
    pub fn set(&self, offset: Vector3) -> Result<(), SettingsError> {
        self.settings
            .set_f64(&Self::key("X"), offset.x)
            .and_then(|_| self.settings.set_f64(&Self::key("Y"), offset.y))
            .inspect_err(|err| log_settings_error(err, "persist_calibration"))
    }
}

impl std::fmt::Debug for CalibrationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationStore")
            .field("key", &CALIBRATION_SETTING_KEY)
            .finish()
    }
}
