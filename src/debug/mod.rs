// Debug helpers for the sample pipeline

pub mod pipeline_tracer;
