//! Integration tests for the calibration workflow
//!
//! These tests validate calibration across process restarts:
//! - Offsets written by a successful calibration survive in a JSON settings file
//! - A fresh processor reads the persisted offsets at construction
//! - Rejected calibrations leave both memory and disk untouched

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use saber_accel::{
    AccelerometerProcessor, CalibrationAxes, JsonFileSettings, SettingsStore, SyntheticSensor,
    Vector3,
};

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_settings_path(name: &str) -> PathBuf {
    let n = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "saber_accel_{}_{}_{}.json",
        name,
        std::process::id(),
        n
    ))
}

fn open_processor(path: &PathBuf) -> AccelerometerProcessor {
    let settings = JsonFileSettings::open(path).expect("settings should open");
    AccelerometerProcessor::with_defaults(Arc::new(SyntheticSensor::new()), Arc::new(settings))
        .expect("processor should build")
}

fn settle(processor: &AccelerometerProcessor, sample: Vector3) {
    for i in 0..processor.samples_count() + 5 {
        processor.process_sample(sample, i as u64 * 20);
    }
}

/// Test calibration round-trip through a settings file
///
/// Test steps:
/// 1. Settle a processor on a slightly tilted surface
/// 2. Calibrate X, then the combined X|Y request (which updates Y)
/// 3. Drop the processor and build a new one on the same file
/// 4. Verify the new processor starts with the same offset
#[test]
fn test_calibration_survives_restart() {
    let path = unique_settings_path("roundtrip");

    let written = {
        let processor = open_processor(&path);
        settle(&processor, Vector3::new(0.12, -0.07, -0.99));
        assert!(processor.calibrate(CalibrationAxes::X));
        assert!(processor.calibrate_xy(), "device should be calibratable");
        processor.calibration_offset()
    };
    assert_eq!(written.z, 0.0);
    assert!(path.exists());

    let processor = open_processor(&path);
    assert_eq!(processor.calibration_offset(), written);

    // Same tilt now reads as level on X and Y
    let reading = processor.process_sample(Vector3::new(0.12, -0.07, -0.99), 0);
    assert!(reading.raw_acceleration.x.abs() < 1e-9);
    assert!(reading.raw_acceleration.y.abs() < 1e-9);

    let _ = std::fs::remove_file(&path);
}

/// Test that a single-axis calibration persists the untouched axis unchanged
#[test]
fn test_single_axis_calibration_keeps_other_persisted_axis() {
    let path = unique_settings_path("single_axis");
    {
        let settings = JsonFileSettings::open(&path).unwrap();
        settings.set_f64("AccelerometerCalibrationY", 0.04).unwrap();
    }

    {
        let processor = open_processor(&path);
        settle(&processor, Vector3::new(-0.1, 0.2, -0.97));
        assert!(processor.calibrate(CalibrationAxes::X));
        assert_eq!(processor.calibration_offset().y, 0.04);
    }

    let settings = JsonFileSettings::open(&path).unwrap();
    assert_eq!(settings.get_f64("AccelerometerCalibrationY", 0.0), 0.04);
    assert!(settings.get_f64("AccelerometerCalibrationX", 0.0) > 0.0);

    let _ = std::fs::remove_file(&path);
}

/// Test that an out-of-bound tilt is rejected without touching persistence
#[test]
fn test_rejected_calibration_writes_nothing() {
    let path = unique_settings_path("rejected");
    let processor = open_processor(&path);

    // ~37 deg tilt on X, beyond the 20 deg bound
    settle(&processor, Vector3::new(0.6, 0.0, -0.8));
    assert!(processor.is_device_stable());
    assert!(!processor.can_calibrate(CalibrationAxes::X));
    assert!(!processor.calibrate(CalibrationAxes::X));
    assert_eq!(processor.calibration_offset(), Vector3::ZERO);
    assert!(!path.exists(), "nothing should have been persisted");
}
