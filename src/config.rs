//! Configuration management for pipeline tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling filter, stability and shake parameters to be adjusted without
//! recompilation. Angles are stored in degrees; the processor converts them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::shake::{
    validate_threshold, DEFAULT_SHAKE_END_THRESHOLD, DEFAULT_SHAKE_THRESHOLD,
};
use crate::error::ConfigError;
use crate::filter::smoother::DEFAULT_SAMPLES_COUNT;
use crate::filter::strategy::{ACCELERATION_NOISE_THRESHOLD, DEFAULT_COEFFICIENT};

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub stability: StabilityConfig,
    #[serde(default)]
    pub shake: ShakeConfig,
}

/// Per-axis filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Smoothing factor K shared by the low-pass and optimal filters
    pub low_pass_coefficient: f64,
    /// Sample-to-sample jump (g) still treated as noise by the optimal filter
    pub noise_threshold: f64,
    /// Window size of the running average (25 = 500 ms at 50 Hz)
    pub samples_count: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            low_pass_coefficient: DEFAULT_COEFFICIENT,
            noise_threshold: ACCELERATION_NOISE_THRESHOLD,
            samples_count: DEFAULT_SAMPLES_COUNT,
        }
    }
}

/// Stability and calibration bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Tilt beyond which an axis cannot be calibrated
    pub maximum_calibration_tilt_angle_deg: f64,
    /// Allowed tilt difference between average and filtered value while stable
    pub maximum_stability_tilt_delta_angle_deg: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            maximum_calibration_tilt_angle_deg: 20.0,
            maximum_stability_tilt_delta_angle_deg: 0.5,
        }
    }
}

impl StabilityConfig {
    /// sin(calibration tilt): largest per-axis average that may be zeroed
    pub fn maximum_calibration_offset(&self) -> f64 {
        self.maximum_calibration_tilt_angle_deg.to_radians().sin()
    }

    /// sin(stability tilt delta): per-axis tolerance for the stability counter
    pub fn maximum_stability_delta_offset(&self) -> f64 {
        self.maximum_stability_tilt_delta_angle_deg.to_radians().sin()
    }
}

/// Shake detector thresholds, both in (0, 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeConfig {
    pub shake_threshold: f64,
    pub shake_end_threshold: f64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            shake_threshold: DEFAULT_SHAKE_THRESHOLD,
            shake_end_threshold: DEFAULT_SHAKE_END_THRESHOLD,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or defaults if the file is missing or invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check the values that have hard limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold("shake_threshold", self.shake.shake_threshold)?;
        validate_threshold("shake_end_threshold", self.shake.shake_end_threshold)?;
        Ok(())
    }
}
