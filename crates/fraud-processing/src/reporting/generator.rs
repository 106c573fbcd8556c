use crate::error::{ProcessingError, Result};
use crate::io::{OutputEncoding, SourceEncoding};
use crate::pipeline::{DatasetFiles, RunOutcome};
use crate::types::{
    CleaningStep, DatasetCleaning, DatasetDiagnostics, LabelDistribution,
    LabelNormalizationSummary, QualityReport,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the JSON report written next to the cleaned datasets.
pub const REPORT_FILE_NAME: &str = "cleaning_report.json";

// ============================================================================
// Report Types
// ============================================================================

/// Everything a run did, in one serializable value.
///
/// Used both for `--json` output and for the `--emit-report` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub duration_ms: u64,
    pub train: DatasetReport,
    pub test: DatasetReport,
    /// Cleaning steps in the order they were applied
    pub cleaning_steps: Vec<CleaningStep>,
}

/// Per-dataset section of a [`RunReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetReport {
    pub input_file: Option<String>,
    pub input_encoding: Option<SourceEncoding>,
    /// Path of the cleaned file (if written)
    pub output_file: Option<String>,
    pub output_encoding: Option<OutputEncoding>,
    pub labels: LabelNormalizationSummary,
    pub quality: QualityReport,
    pub distribution: LabelDistribution,
    pub rows_before: usize,
    pub rows_after: usize,
    pub retention_percentage: f64,
}

impl DatasetReport {
    fn new(files: &DatasetFiles, diagnostics: &DatasetDiagnostics, cleaning: &DatasetCleaning) -> Self {
        Self {
            input_file: files.input.as_deref().map(display_path),
            input_encoding: files.input_encoding,
            output_file: files.output.as_deref().map(display_path),
            output_encoding: files.output_encoding,
            labels: diagnostics.labels.clone(),
            quality: diagnostics.quality.clone(),
            distribution: diagnostics.distribution.clone(),
            rows_before: cleaning.rows_before,
            rows_after: cleaning.rows_after,
            retention_percentage: cleaning.retention_percentage(),
        }
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

// ============================================================================
// Generator
// ============================================================================

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./data/processed/cleaned"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Assemble the report for a finished run.
    pub fn build_report(outcome: &RunOutcome) -> RunReport {
        let result = &outcome.result;
        RunReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            duration_ms: result.duration_ms,
            train: DatasetReport::new(
                &outcome.train,
                &result.train_diagnostics,
                &result.cleaning.train,
            ),
            test: DatasetReport::new(
                &outcome.test,
                &result.test_diagnostics,
                &result.cleaning.test,
            ),
            cleaning_steps: result.cleaning.steps.clone(),
        }
    }

    /// Write `report` as pretty JSON to `<output_dir>/cleaning_report.json`.
    pub fn write_report_to_file(&self, report: &RunReport) -> Result<PathBuf> {
        let report_path = self.output_dir.join(REPORT_FILE_NAME);
        let write_err = |e: std::io::Error| ProcessingError::Write {
            path: report_path.clone(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.output_dir).map_err(write_err)?;
        let mut file = File::create(&report_path).map_err(write_err)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())
            .map_err(write_err)?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Human-readable cleaning summary.
    ///
    /// Every step is listed; a dataset's removal line only appears when that
    /// step actually removed rows from it.
    pub fn render_summary(report: &RunReport) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "=== Cleaning report ===");
        for step in &report.cleaning_steps {
            let _ = writeln!(out, "{} ({}):", step.step_name(), step.step.description());
            if step.train_rows_removed > 0 {
                let _ = writeln!(out, "  train removed: {} rows", step.train_rows_removed);
            }
            if step.test_rows_removed > 0 {
                let _ = writeln!(out, "  test removed: {} rows", step.test_rows_removed);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Final sizes:");
        for (name, section) in [("train", &report.train), ("test", &report.test)] {
            let _ = writeln!(
                out,
                "  {}: {} rows (retained {:.1}%)",
                name, section.rows_after, section.retention_percentage
            );
        }

        let written: Vec<_> = [&report.train, &report.test]
            .into_iter()
            .filter_map(|s| Some((s.output_file.as_deref()?, s.output_encoding?)))
            .collect();
        if !written.is_empty() {
            let _ = writeln!(out);
            for (path, encoding) in written {
                let _ = writeln!(out, "Saved {} ({})", path, encoding.label());
            }
        }

        out
    }
}
