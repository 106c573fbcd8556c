//! Pipeline module.
//!
//! This module provides the train/test cleaning pipeline.

mod builder;

pub use builder::{DatasetFiles, Pipeline, PipelineBuilder, RunOutcome};
