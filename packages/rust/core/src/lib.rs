//! Pipeline orchestration for Inkpress.
//!
//! Composes the topic source, prompt builder, generation client, assembler,
//! and the two sinks into the single/custom/batch invocation modes.

pub mod pipeline;

pub use pipeline::{
    BatchSummary, Pipeline, PipelineOptions, PostOutcome, ProgressReporter, RowFailure,
    SilentProgress,
};
