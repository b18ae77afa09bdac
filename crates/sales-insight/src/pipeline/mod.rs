//! Pipeline module.
//!
//! This module wires the parser, inspector, cleaner and aggregator into a
//! single run, with optional progress reporting.

mod builder;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
