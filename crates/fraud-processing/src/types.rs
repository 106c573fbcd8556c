use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which of the two datasets a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Train,
    Test,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Outcome of normalizing the `is_fraud` labels of one dataset.
///
/// Missing and unparseable labels both become `0`; they are counted
/// separately so the two conditions stay visible in the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelNormalizationSummary {
    pub dataset: Option<DatasetKind>,
    /// Labels recognised as fraud (`1`).
    pub positive: usize,
    /// Labels recognised as non-fraud (`0`).
    pub negative: usize,
    /// Null labels coerced to `0`.
    pub coerced_missing: usize,
    /// Non-null labels outside the recognised vocabulary, coerced to `0`.
    pub coerced_unparseable: usize,
}

impl LabelNormalizationSummary {
    /// Total number of labels that were coerced to `0`.
    pub fn coerced(&self) -> usize {
        self.coerced_missing + self.coerced_unparseable
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.coerced()
    }
}

/// Null statistics of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNullStats {
    pub column: String,
    pub null_count: usize,
    /// Percentage of rows (0.0 - 100.0).
    pub null_percentage: f64,
}

/// Per-column null report for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub dataset: DatasetKind,
    pub row_count: usize,
    pub columns: Vec<ColumnNullStats>,
}

impl QualityReport {
    pub fn column(&self, name: &str) -> Option<&ColumnNullStats> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Frequency of each distinct `is_fraud` value in one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub dataset: DatasetKind,
    pub counts: BTreeMap<String, usize>,
    /// `min(count) / max(count)`, only when exactly two values are present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_ratio: Option<f64>,
}

// ============================================================================
// Cleaning outcome
// ============================================================================

/// Identifies one stage of the row/column cleaner, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStepKind {
    DropMissingDialogueContent,
    DropMissingIsFraud,
    RemediateCallType,
    RemediateInteractionStrategy,
    ReconcileFraudType,
}

impl CleaningStepKind {
    /// All steps in the order the cleaner applies them.
    pub const ORDER: [CleaningStepKind; 5] = [
        Self::DropMissingDialogueContent,
        Self::DropMissingIsFraud,
        Self::RemediateCallType,
        Self::RemediateInteractionStrategy,
        Self::ReconcileFraudType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DropMissingDialogueContent => "drop_missing_dialogue_content",
            Self::DropMissingIsFraud => "drop_missing_is_fraud",
            Self::RemediateCallType => "remediate_call_type",
            Self::RemediateInteractionStrategy => "remediate_interaction_strategy",
            Self::ReconcileFraudType => "reconcile_fraud_type",
        }
    }

    /// Human-readable description used in the text summary.
    pub fn description(&self) -> &'static str {
        match self {
            Self::DropMissingDialogueContent => "Remove rows with empty specific_dialogue_content",
            Self::DropMissingIsFraud => "Remove rows with empty is_fraud",
            Self::RemediateCallType => "Drop or fill missing call_type",
            Self::RemediateInteractionStrategy => "Drop or fill missing interaction_strategy",
            Self::ReconcileFraudType => "Reconcile fraud_type with is_fraud",
        }
    }
}

impl fmt::Display for CleaningStepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the categorical remediation did to one column of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemedyAction {
    /// Rows with a null in the column were removed.
    DroppedRows,
    /// Nulls were replaced with `"unknown"`.
    FilledUnknown,
}

/// Remedy chosen for a column plus the null fraction that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnRemedy {
    pub action: RemedyAction,
    /// Null fraction (0.0 - 1.0) measured when the column was processed.
    pub null_fraction: f64,
}

/// Per-dataset record of one cleaning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub step: CleaningStepKind,
    pub rows_before: usize,
    pub rows_after: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remedy: Option<ColumnRemedy>,
    /// True when the step was a no-op because its optional column is absent.
    #[serde(default)]
    pub skipped: bool,
}

impl StepOutcome {
    pub fn rows_removed(&self) -> usize {
        self.rows_before - self.rows_after
    }
}

/// Everything the cleaner did to a single dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCleaning {
    pub dataset: DatasetKind,
    pub rows_before: usize,
    pub rows_after: usize,
    pub steps: Vec<StepOutcome>,
}

impl DatasetCleaning {
    pub fn step(&self, kind: CleaningStepKind) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == kind)
    }

    /// Percentage of rows kept (100.0 for an empty input).
    pub fn retention_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            100.0
        } else {
            self.rows_after as f64 / self.rows_before as f64 * 100.0
        }
    }
}

/// One entry of the combined cleaning report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningStep {
    pub step: CleaningStepKind,
    pub train_rows_removed: usize,
    pub test_rows_removed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_remedy: Option<ColumnRemedy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_remedy: Option<ColumnRemedy>,
}

impl CleaningStep {
    pub fn step_name(&self) -> &'static str {
        self.step.name()
    }
}

/// Combined outcome of cleaning the train and test datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Steps in the order they were applied.
    pub steps: Vec<CleaningStep>,
    pub train: DatasetCleaning,
    pub test: DatasetCleaning,
}

impl CleaningReport {
    /// Merge two independent per-dataset outcomes step by step.
    pub fn from_outcomes(train: DatasetCleaning, test: DatasetCleaning) -> Self {
        let steps = CleaningStepKind::ORDER
            .iter()
            .map(|&kind| {
                let train_step = train.step(kind);
                let test_step = test.step(kind);
                CleaningStep {
                    step: kind,
                    train_rows_removed: train_step.map_or(0, StepOutcome::rows_removed),
                    test_rows_removed: test_step.map_or(0, StepOutcome::rows_removed),
                    train_remedy: train_step.and_then(|s| s.remedy),
                    test_remedy: test_step.and_then(|s| s.remedy),
                }
            })
            .collect();

        Self { steps, train, test }
    }

    pub fn step(&self, kind: CleaningStepKind) -> Option<&CleaningStep> {
        self.steps.iter().find(|s| s.step == kind)
    }
}

// ============================================================================
// Pipeline result
// ============================================================================

/// Diagnostics gathered for one dataset before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDiagnostics {
    pub labels: LabelNormalizationSummary,
    pub quality: QualityReport,
    pub distribution: LabelDistribution,
}

/// Output of [`Pipeline::process`](crate::Pipeline::process).
///
/// The cleaned frames are carried alongside the diagnostics but are not
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    #[serde(skip)]
    pub train: DataFrame,
    #[serde(skip)]
    pub test: DataFrame,
    pub train_diagnostics: DatasetDiagnostics,
    pub test_diagnostics: DatasetDiagnostics,
    pub cleaning: CleaningReport,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(dataset: DatasetKind, removed: [usize; 5]) -> DatasetCleaning {
        let mut rows = 100;
        let mut steps = Vec::new();
        for (kind, n) in CleaningStepKind::ORDER.iter().zip(removed) {
            steps.push(StepOutcome {
                step: *kind,
                rows_before: rows,
                rows_after: rows - n,
                remedy: None,
                skipped: false,
            });
            rows -= n;
        }
        DatasetCleaning {
            dataset,
            rows_before: 100,
            rows_after: rows,
            steps,
        }
    }

    #[test]
    fn test_report_preserves_step_order() {
        let report = CleaningReport::from_outcomes(
            outcome(DatasetKind::Train, [1, 0, 3, 0, 0]),
            outcome(DatasetKind::Test, [0, 0, 0, 2, 0]),
        );

        let names: Vec<_> = report.steps.iter().map(|s| s.step_name()).collect();
        assert_eq!(
            names,
            vec![
                "drop_missing_dialogue_content",
                "drop_missing_is_fraud",
                "remediate_call_type",
                "remediate_interaction_strategy",
                "reconcile_fraud_type",
            ]
        );
        assert_eq!(report.steps[0].train_rows_removed, 1);
        assert_eq!(report.steps[2].train_rows_removed, 3);
        assert_eq!(report.steps[3].test_rows_removed, 2);
    }

    #[test]
    fn test_retention_percentage() {
        let cleaning = outcome(DatasetKind::Train, [10, 0, 0, 0, 0]);
        assert!((cleaning.retention_percentage() - 90.0).abs() < 1e-9);

        let empty = DatasetCleaning {
            dataset: DatasetKind::Test,
            rows_before: 0,
            rows_after: 0,
            steps: vec![],
        };
        assert_eq!(empty.retention_percentage(), 100.0);
    }

    #[test]
    fn test_label_summary_totals() {
        let summary = LabelNormalizationSummary {
            dataset: Some(DatasetKind::Train),
            positive: 3,
            negative: 4,
            coerced_missing: 1,
            coerced_unparseable: 2,
        };
        assert_eq!(summary.coerced(), 3);
        assert_eq!(summary.total(), 10);
    }

    #[test]
    fn test_step_kind_serializes_snake_case() {
        let json = serde_json::to_string(&CleaningStepKind::RemediateCallType).unwrap();
        assert_eq!(json, "\"remediate_call_type\"");
        assert_eq!(DatasetKind::Test.to_string(), "test");
    }
}
