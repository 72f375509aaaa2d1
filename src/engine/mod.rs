//! Engine module housing the accelerometer pipeline.
//!
//! This module exposes the trait-based sensor backends (`backend`), the
//! composite `Reading`, and the `AccelerometerProcessor` orchestration layer
//! (`processor`).

pub mod backend;
pub mod processor;
pub mod reading;

pub use backend::{SampleSink, SensorSource, SyntheticSensor, DEFAULT_SAMPLE_PERIOD_MS};
pub use processor::{AccelerometerProcessor, ProcessorBuilder};
pub use reading::Reading;
