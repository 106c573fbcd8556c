//! Fraud Dialogue Dataset Cleaning Library
//!
//! Cleans a pair of fraud-labelled dialogue datasets (train and test) for
//! downstream model training, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Label normalization**: `is_fraud` values such as `TRUE`, `False`, `1`
//!   and `0` become an integer 0/1 column; anything unrecognised becomes 0
//!   and is counted separately
//! - **Quality reporting**: per-column null counts and percentages
//! - **Label distribution**: value counts and a balance ratio for binary labels
//! - **Row/column cleaning**: a fixed sequence of drop/fill steps with a
//!   per-step removal report
//! - **Encoding-aware I/O**: input encoding detection (`utf-8`, `gbk`,
//!   `utf-8-sig`) and UTF-8 output with a BOM, falling back to plain UTF-8
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fraud_processing::{Pipeline, PipelineConfig, ProjectConfig};
//! use std::path::Path;
//!
//! let project = ProjectConfig::load(Path::new("config/config.toml"))?;
//! let config = PipelineConfig::builder()
//!     .paths(project.resolve(Path::new(".")))
//!     .emit_report(true)
//!     .build()?;
//!
//! let outcome = Pipeline::builder().config(config).build()?.run()?;
//! for step in &outcome.result.cleaning.steps {
//!     println!(
//!         "{}: train -{}, test -{}",
//!         step.step_name(),
//!         step.train_rows_removed,
//!         step.test_rows_removed
//!     );
//! }
//! ```
//!
//! # In-memory use
//!
//! [`Pipeline::process`] takes two DataFrames and never touches the disk.
//! The individual stages are also usable on their own:
//!
//! ```rust,ignore
//! use fraud_processing::{DataCleaner, DataQualityAnalyzer, DatasetKind, LabelNormalizer};
//!
//! let (df, labels) = LabelNormalizer.normalize(df, DatasetKind::Train)?;
//! let quality = DataQualityAnalyzer::null_report(&df, DatasetKind::Train);
//! let (cleaned, outcome) = DataCleaner::default().clean(df, DatasetKind::Train)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod quality;
pub mod reporting;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{CleanedPair, DataCleaner, LabelNormalizer, LabelValue};
pub use config::{
    ConfigValidationError, DataPaths, PipelineConfig, PipelineConfigBuilder, ProjectConfig,
};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use io::{DatasetReader, DatasetWriter, LoadedDataset, OutputEncoding, SourceEncoding};
pub use pipeline::{DatasetFiles, Pipeline, PipelineBuilder, RunOutcome};
pub use quality::DataQualityAnalyzer;
pub use reporting::{DatasetReport, ReportGenerator, RunReport};
pub use schema::{DialogueSchema, ResolvedSchema};
pub use types::{
    CleaningReport, CleaningStep, CleaningStepKind, ColumnNullStats, ColumnRemedy,
    DatasetCleaning, DatasetDiagnostics, DatasetKind, LabelDistribution,
    LabelNormalizationSummary, PipelineResult, QualityReport, RemedyAction, StepOutcome,
};
