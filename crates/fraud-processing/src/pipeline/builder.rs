//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating a train/test cleaning run.

use crate::cleaner::{CleanedPair, DataCleaner, LabelNormalizer};
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::io::{DatasetReader, DatasetWriter, OutputEncoding, SourceEncoding};
use crate::quality::DataQualityAnalyzer;
use crate::reporting::ReportGenerator;
use crate::types::{DatasetDiagnostics, DatasetKind, LabelNormalizationSummary, PipelineResult};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Files read and written for one dataset during [`Pipeline::run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetFiles {
    pub input: Option<PathBuf>,
    pub input_encoding: Option<SourceEncoding>,
    pub output: Option<PathBuf>,
    pub output_encoding: Option<OutputEncoding>,
}

/// Result of [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: PipelineResult,
    pub train: DatasetFiles,
    pub test: DatasetFiles,
    /// Location of `cleaning_report.json` when one was written.
    pub report_path: Option<PathBuf>,
}

/// The train/test cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use fraud_processing::{Pipeline, PipelineConfig};
///
/// // File to file, using the configured paths
/// let outcome = Pipeline::builder()
///     .config(PipelineConfig::builder().emit_report(true).build()?)
///     .build()?
///     .run()?;
///
/// // In memory
/// let result = Pipeline::builder().build()?.process(train_df, test_df)?;
/// println!("{} train rows kept", result.train.height());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    reader: DatasetReader,
    writer: DatasetWriter,
    normalizer: LabelNormalizer,
    cleaner: DataCleaner,
    reporter: ReportGenerator,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize, analyze and clean an in-memory train/test pair.
    ///
    /// Nothing is read from or written to disk.
    pub fn process(&self, train: DataFrame, test: DataFrame) -> Result<PipelineResult> {
        self.process_internal(train, test).inspect_err(|e| {
            error!("Pipeline error: {}", e);
        })
    }

    /// Run end to end with the configured paths.
    ///
    /// Both inputs are checked for existence before either is read. Outputs
    /// are written only when `save_to_disk` is set, and the JSON report only
    /// when `emit_report` is set.
    pub fn run(&self) -> Result<RunOutcome> {
        self.run_internal().inspect_err(|e| {
            error!("Pipeline error: {}", e);
        })
    }

    fn run_internal(&self) -> Result<RunOutcome> {
        let paths = &self.config.paths;

        info!("Loading datasets...");
        // Checked together so a missing test file fails before train is decoded.
        self.reader.ensure_exists(&paths.train_data)?;
        self.reader.ensure_exists(&paths.test_data)?;
        let train = self.reader.read(&paths.train_data)?;
        let test = self.reader.read(&paths.test_data)?;

        let mut train_files = DatasetFiles {
            input: Some(train.path),
            input_encoding: Some(train.encoding),
            ..Default::default()
        };
        let mut test_files = DatasetFiles {
            input: Some(test.path),
            input_encoding: Some(test.encoding),
            ..Default::default()
        };

        let mut result = self.process_internal(train.df, test.df)?;

        if self.config.save_to_disk {
            info!("Saving cleaned datasets...");
            let train_path = self.config.train_output_path();
            let test_path = self.config.test_output_path();
            let (train_encoding, test_encoding) = self.writer.write_pair(
                (&mut result.train, &train_path),
                (&mut result.test, &test_path),
            )?;
            train_files.output_encoding = Some(train_encoding);
            train_files.output = Some(train_path);
            test_files.output_encoding = Some(test_encoding);
            test_files.output = Some(test_path);
        } else {
            info!("Skipping output files (save_to_disk disabled)");
        }

        let mut outcome = RunOutcome {
            result,
            train: train_files,
            test: test_files,
            report_path: None,
        };

        if self.config.emit_report {
            let report = ReportGenerator::build_report(&outcome);
            outcome.report_path = Some(self.reporter.write_report_to_file(&report)?);
        }

        Ok(outcome)
    }

    fn process_internal(&self, train: DataFrame, test: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!(
            "Starting cleaning pipeline: {} train rows, {} test rows",
            train.height(),
            test.height()
        );

        info!("Step 1: Normalizing is_fraud labels...");
        let (train, train_labels) = self.normalizer.normalize(train, DatasetKind::Train)?;
        let (test, test_labels) = self.normalizer.normalize(test, DatasetKind::Test)?;

        info!("Step 2: Analyzing data quality...");
        let train_diagnostics = diagnose(&train, DatasetKind::Train, train_labels)?;
        let test_diagnostics = diagnose(&test, DatasetKind::Test, test_labels)?;

        info!("Step 3: Cleaning datasets...");
        let CleanedPair {
            train,
            test,
            report,
        } = self.cleaner.clean_pair(train, test)?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Pipeline completed in {}ms: {} train rows ({:.1}% kept), {} test rows ({:.1}% kept)",
            duration_ms,
            train.height(),
            report.train.retention_percentage(),
            test.height(),
            report.test.retention_percentage()
        );

        Ok(PipelineResult {
            train,
            test,
            train_diagnostics,
            test_diagnostics,
            cleaning: report,
            duration_ms,
        })
    }
}

fn diagnose(
    df: &DataFrame,
    dataset: DatasetKind,
    labels: LabelNormalizationSummary,
) -> Result<DatasetDiagnostics> {
    let quality = DataQualityAnalyzer::null_report(df, dataset);
    let distribution = DataQualityAnalyzer::label_distribution(df, dataset)?;
    if let Some(ratio) = distribution.balance_ratio {
        info!("[{}] is_fraud balance ratio: {:.3}", dataset, ratio);
    }
    Ok(DatasetDiagnostics {
        labels,
        quality,
        distribution,
    })
}

/// Builder for creating a [`Pipeline`] with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::builder().save_to_disk(false).build()?)
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = ReportGenerator::new(config.output_dir());
        let cleaner = DataCleaner::new(config.row_drop_threshold);

        Ok(Pipeline {
            config,
            reader: DatasetReader,
            writer: DatasetWriter,
            normalizer: LabelNormalizer,
            cleaner,
            reporter,
        })
    }
}
