// Pipeline Tracer - Diagnostic logging for the accelerometer pipeline
//
// Provides structured trace points along the per-sample path so filter
// behaviour can be followed sample by sample without a debugger. Each stage
// logs its values when tracing is enabled and costs one atomic load when not.
//
// Usage:
//   - Enable with SABER_TRACE=1 environment variable
//   - Traces appear in logs with [TRACE] prefix
//   - Each trace includes stage name, sequence number, and stage values

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::vector::Vector3;

/// Global flag to enable/disable pipeline tracing
static TRACING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Counter for trace events (helps correlate related traces)
static TRACE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Initialize pipeline tracing based on environment variable
pub fn init() {
    let enabled = std::env::var("SABER_TRACE")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);
    // Only ever switches tracing on; a runtime enable() is not undone
    if enabled && !TRACING_ENABLED.swap(true, Ordering::SeqCst) {
        log::info!("[TRACE] Pipeline tracing ENABLED - set SABER_TRACE=0 to disable");
    }
}

/// Check if tracing is enabled
#[inline]
pub fn is_enabled() -> bool {
    TRACING_ENABLED.load(Ordering::Relaxed)
}

/// Enable tracing at runtime
pub fn enable() {
    TRACING_ENABLED.store(true, Ordering::SeqCst);
    log::info!("[TRACE] Pipeline tracing enabled at runtime");
}

/// Disable tracing at runtime
pub fn disable() {
    TRACING_ENABLED.store(false, Ordering::SeqCst);
    log::info!("[TRACE] Pipeline tracing disabled at runtime");
}

/// Pipeline stages for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Raw sample delivered by the sensor
    SampleReceived,
    /// Low-pass and optimal filters applied
    Filtered,
    /// Running average updated
    Averaged,
    /// Device stability counter updated
    Stability,
    /// Composite reading handed to listeners
    ReadingPublished,
    /// Shake episode started
    ShakeDetected,
    /// Calibration attempted
    Calibration,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::SampleReceived => "SAMPLE",
            PipelineStage::Filtered => "FILTER",
            PipelineStage::Averaged => "AVERAGE",
            PipelineStage::Stability => "STABLE",
            PipelineStage::ReadingPublished => "READING_TX",
            PipelineStage::ShakeDetected => "SHAKE",
            PipelineStage::Calibration => "CALIBRATE",
        }
    }
}

/// Log a trace event at a pipeline stage
///
/// Only logs if SABER_TRACE=1 is set (or `enable()` was called).
#[inline]
pub fn trace(stage: PipelineStage, message: &str) {
    if !is_enabled() {
        return;
    }

    let id = TRACE_COUNTER.fetch_add(1, Ordering::Relaxed);

    log::info!("[TRACE] {:>10} #{:06} | {}", stage.as_str(), id, message);
}

/// Trace a raw sample
pub fn trace_sample(raw: Vector3, timestamp_ms: u64) {
    if is_enabled() {
        trace(
            PipelineStage::SampleReceived,
            &format!("t={}ms raw={}", timestamp_ms, raw),
        );
    }
}

/// Trace both single-stage filter outputs
pub fn trace_filtered(low_pass: Vector3, optimal: Vector3) {
    if is_enabled() {
        trace(
            PipelineStage::Filtered,
            &format!("low_pass={} optimal={}", low_pass, optimal),
        );
    }
}

/// Trace running average
pub fn trace_average(average: Vector3) {
    if is_enabled() {
        trace(PipelineStage::Averaged, &format!("average={}", average));
    }
}

/// Trace stability counter
pub fn trace_stability(count: usize, capacity: usize, worst_deviation: f64) {
    if is_enabled() {
        trace(
            PipelineStage::Stability,
            &format!(
                "count={}/{} worst_deviation={:.5}",
                count, capacity, worst_deviation
            ),
        );
    }
}

/// Trace reading publication
pub fn trace_reading_published(timestamp_ms: u64, listeners: usize) {
    if is_enabled() {
        trace(
            PipelineStage::ReadingPublished,
            &format!("t={}ms listeners={}", timestamp_ms, listeners),
        );
    }
}

/// Trace shake episode start
pub fn trace_shake(timestamp_ms: u64) {
    if is_enabled() {
        trace(PipelineStage::ShakeDetected, &format!("t={}ms", timestamp_ms));
    }
}

/// Trace calibration attempt
pub fn trace_calibration(axes: &str, accepted: bool, offset: Vector3) {
    if is_enabled() {
        trace(
            PipelineStage::Calibration,
            &format!(
                "axes={} {} offset={}",
                axes,
                if accepted { "ACCEPTED" } else { "REJECTED" },
                offset
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_disable() {
        enable();
        assert!(is_enabled());
        trace_sample(Vector3::new(0.0, 0.0, -1.0), 20);
        disable();
        assert!(!is_enabled());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::SampleReceived.as_str(), "SAMPLE");
        assert_eq!(PipelineStage::ShakeDetected.as_str(), "SHAKE");
    }
}
