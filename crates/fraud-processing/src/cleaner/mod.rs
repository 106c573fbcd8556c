//! Data cleaning module for dialogue datasets.
//!
//! This module provides functionality for:
//! - Normalizing `is_fraud` labels to {0, 1}
//! - Removing rows without dialogue content or label
//! - Dropping or filling missing categorical values
//! - Reconciling `fraud_type` with `is_fraud`

mod labels;
mod remediation;

pub use labels::{LabelNormalizer, LabelValue};

use crate::config::DEFAULT_ROW_DROP_THRESHOLD;
use crate::error::{Result, ResultExt};
use crate::schema::{
    CALL_TYPE, CATEGORICAL_COLUMNS, DIALOGUE_CONTENT, DialogueSchema, IS_FRAUD, ResolvedSchema,
};
use crate::types::{CleaningReport, CleaningStepKind, DatasetCleaning, DatasetKind, StepOutcome};
use crate::utils::drop_null_rows;
use polars::prelude::*;
use tracing::{debug, info};

/// Cleaned train and test datasets plus the combined step report.
#[derive(Debug, Clone)]
pub struct CleanedPair {
    pub train: DataFrame,
    pub test: DataFrame,
    pub report: CleaningReport,
}

/// Row/column cleaner applying the fixed step sequence to one dataset at a time.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    schema: DialogueSchema,
    row_drop_threshold: f64,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_DROP_THRESHOLD)
    }
}

impl DataCleaner {
    pub fn new(row_drop_threshold: f64) -> Self {
        Self {
            schema: DialogueSchema::default(),
            row_drop_threshold,
        }
    }

    pub fn row_drop_threshold(&self) -> f64 {
        self.row_drop_threshold
    }

    /// Clean both datasets independently and merge their step records.
    ///
    /// Both frames are validated against the schema before either is touched.
    pub fn clean_pair(&self, train: DataFrame, test: DataFrame) -> Result<CleanedPair> {
        let train_schema = self.schema.resolve(&train, DatasetKind::Train)?;
        let test_schema = self.schema.resolve(&test, DatasetKind::Test)?;

        let (train, train_outcome) = self.clean_resolved(train, train_schema)?;
        let (test, test_outcome) = self.clean_resolved(test, test_schema)?;

        Ok(CleanedPair {
            train,
            test,
            report: CleaningReport::from_outcomes(train_outcome, test_outcome),
        })
    }

    /// Clean a single dataset.
    ///
    /// `is_fraud` is expected to be normalized already (see [`LabelNormalizer`]).
    /// Steps, in order:
    /// 1. Remove rows with null `specific_dialogue_content`
    /// 2. Remove rows with null `is_fraud`
    /// 3. For `call_type` then `interaction_strategy`: drop null rows when the
    ///    null fraction is in (0, threshold), otherwise fill with `"unknown"`
    /// 4. Reconcile `fraud_type` (skipped when the column is absent)
    pub fn clean(&self, df: DataFrame, dataset: DatasetKind) -> Result<(DataFrame, DatasetCleaning)> {
        let schema = self.schema.resolve(&df, dataset)?;
        self.clean_resolved(df, schema)
    }

    fn clean_resolved(
        &self,
        df: DataFrame,
        schema: ResolvedSchema,
    ) -> Result<(DataFrame, DatasetCleaning)> {
        let dataset = schema.dataset;
        let rows_before = df.height();
        let mut steps = Vec::with_capacity(CleaningStepKind::ORDER.len());

        info!("Cleaning {} dataset ({} rows)...", dataset, rows_before);

        // 1-2. Mandatory filters
        let mut df = df;
        for (kind, column) in [
            (CleaningStepKind::DropMissingDialogueContent, DIALOGUE_CONTENT),
            (CleaningStepKind::DropMissingIsFraud, IS_FRAUD),
        ] {
            let before = df.height();
            let (filtered, removed) =
                drop_null_rows(df, column).context(format!("{} ({})", kind, dataset))?;
            df = filtered;
            debug!("[{}] {}: removed {} rows", dataset, kind, removed);
            steps.push(StepOutcome {
                step: kind,
                rows_before: before,
                rows_after: df.height(),
                remedy: None,
                skipped: false,
            });
        }

        // 3. Conditional categorical remediation, on the state left by the previous column
        for column in CATEGORICAL_COLUMNS {
            let kind = if column == CALL_TYPE {
                CleaningStepKind::RemediateCallType
            } else {
                CleaningStepKind::RemediateInteractionStrategy
            };
            let before = df.height();
            let (remediated, remedy) =
                remediation::remediate_categorical(df, column, self.row_drop_threshold)
                    .context(format!("{} ({})", kind, dataset))?;
            df = remediated;
            steps.push(StepOutcome {
                step: kind,
                rows_before: before,
                rows_after: df.height(),
                remedy: Some(remedy),
                skipped: false,
            });
        }

        // 4. Fraud-type reconciliation
        let rows = df.height();
        if schema.has_fraud_type {
            let changes = remediation::reconcile_fraud_type(&mut df)
                .context(format!("{} ({})", CleaningStepKind::ReconcileFraudType, dataset))?;
            debug!(
                "[{}] fraud_type: {} set to non_fraud, {} filled with unknown_fraud",
                dataset, changes.marked_non_fraud, changes.filled_unknown
            );
        } else {
            debug!("[{}] No fraud_type column, skipping reconciliation", dataset);
        }
        steps.push(StepOutcome {
            step: CleaningStepKind::ReconcileFraudType,
            rows_before: rows,
            rows_after: rows,
            remedy: None,
            skipped: !schema.has_fraud_type,
        });

        let outcome = DatasetCleaning {
            dataset,
            rows_before,
            rows_after: df.height(),
            steps,
        };
        info!(
            "{} dataset: {} -> {} rows ({:.1}% kept)",
            dataset,
            outcome.rows_before,
            outcome.rows_after,
            outcome.retention_percentage()
        );

        Ok((df, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FRAUD_TYPE, INTERACTION_STRATEGY};
    use crate::types::RemedyAction;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Normalized frame with `n` rows; callers punch nulls into columns.
    fn frame(
        n: usize,
        content_nulls: &[usize],
        call_type_nulls: &[usize],
        strategy_nulls: &[usize],
    ) -> DataFrame {
        let col = |nulls: &[usize], value: &str| -> Vec<Option<String>> {
            (0..n)
                .map(|i| (!nulls.contains(&i)).then(|| format!("{value}{i}")))
                .collect()
        };
        df![
            DIALOGUE_CONTENT => col(content_nulls, "dialogue"),
            IS_FRAUD => (0..n).map(|i| (i % 2) as i32).collect::<Vec<_>>(),
            CALL_TYPE => col(call_type_nulls, "call"),
            INTERACTION_STRATEGY => col(strategy_nulls, "strategy"),
            FRAUD_TYPE => (0..n).map(|i| if i % 2 == 1 { None } else { Some("phishing") }).collect::<Vec<_>>(),
        ]
        .unwrap()
    }

    fn removed(outcome: &DatasetCleaning, kind: CleaningStepKind) -> usize {
        outcome.step(kind).unwrap().rows_removed()
    }

    #[test]
    fn test_drops_missing_dialogue_content() {
        let df = frame(10, &[3], &[], &[]);
        let (df, outcome) = DataCleaner::default().clean(df, DatasetKind::Train).unwrap();

        assert_eq!(df.height(), 9);
        assert_eq!(removed(&outcome, CleaningStepKind::DropMissingDialogueContent), 1);
        assert_eq!(removed(&outcome, CleaningStepKind::DropMissingIsFraud), 0);
        assert_eq!(outcome.rows_before, 10);
        assert_eq!(outcome.rows_after, 9);
    }

    #[test]
    fn test_drops_null_labels() {
        let mut df = frame(4, &[], &[], &[]);
        df.replace(
            IS_FRAUD,
            Series::new(IS_FRAUD.into(), &[Some(1i32), None, Some(0), Some(1)]),
        )
        .unwrap();

        let (df, outcome) = DataCleaner::default().clean(df, DatasetKind::Test).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(removed(&outcome, CleaningStepKind::DropMissingIsFraud), 1);
    }

    #[test]
    fn test_steps_are_recorded_in_order() {
        let (_, outcome) = DataCleaner::default()
            .clean(frame(3, &[], &[], &[]), DatasetKind::Train)
            .unwrap();
        let kinds: Vec<_> = outcome.steps.iter().map(|s| s.step).collect();
        assert_eq!(kinds, CleaningStepKind::ORDER.to_vec());
    }

    #[test]
    fn test_categorical_fraction_uses_current_state() {
        // 20 rows; call_type null at row 0 (5%) -> dropped.
        // interaction_strategy null at rows 0 and 1: 10% before, but row 0 is
        // already gone, so 1/19 ≈ 5.3% -> dropped too.
        let df = frame(20, &[], &[0], &[0, 1]);
        let (df, outcome) = DataCleaner::default().clean(df, DatasetKind::Train).unwrap();

        let call = outcome.step(CleaningStepKind::RemediateCallType).unwrap();
        let strategy = outcome
            .step(CleaningStepKind::RemediateInteractionStrategy)
            .unwrap();
        assert_eq!(call.remedy.unwrap().action, RemedyAction::DroppedRows);
        assert_eq!(strategy.remedy.unwrap().action, RemedyAction::DroppedRows);
        assert!((strategy.remedy.unwrap().null_fraction - 1.0 / 19.0).abs() < 1e-12);
        assert_eq!(df.height(), 18);
    }

    #[test]
    fn test_fraud_type_reconciled() {
        let (df, _) = DataCleaner::default()
            .clean(frame(4, &[], &[], &[]), DatasetKind::Train)
            .unwrap();

        let labels: Vec<_> = df.column(IS_FRAUD).unwrap().i32().unwrap().into_iter().collect();
        let types: Vec<_> = df
            .column(FRAUD_TYPE)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        for (label, fraud_type) in labels.iter().zip(types) {
            match label {
                Some(0) => assert_eq!(fraud_type, Some("non_fraud")),
                _ => assert_eq!(fraud_type, Some("unknown_fraud")),
            }
        }
    }

    #[test]
    fn test_missing_fraud_type_is_skipped() {
        let df = frame(5, &[], &[], &[]).drop(FRAUD_TYPE).unwrap();
        let (df, outcome) = DataCleaner::default().clean(df, DatasetKind::Test).unwrap();

        assert_eq!(df.height(), 5);
        assert!(!df.get_column_names().iter().any(|c| c.as_str() == FRAUD_TYPE));
        assert!(outcome.step(CleaningStepKind::ReconcileFraudType).unwrap().skipped);
    }

    #[test]
    fn test_missing_required_column_aborts() {
        let df = frame(5, &[], &[], &[]).drop(CALL_TYPE).unwrap();
        let err = DataCleaner::default()
            .clean(df, DatasetKind::Train)
            .unwrap_err();
        assert!(err.is_schema_error());
        assert!(err.to_string().contains(CALL_TYPE));
    }

    #[test]
    fn test_clean_pair_validates_both_before_cleaning() {
        let train = frame(5, &[], &[], &[]);
        let test = frame(5, &[], &[], &[]).drop(INTERACTION_STRATEGY).unwrap();
        let err = DataCleaner::default().clean_pair(train, test).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ProcessingError::Schema {
                dataset: DatasetKind::Test,
                ..
            }
        ));
    }

    #[test]
    fn test_clean_pair_branches_independently() {
        // train: 1/20 call_type nulls (5%) -> drop; test: 4/20 (20%) -> fill
        let train = frame(20, &[], &[7], &[]);
        let test = frame(20, &[], &[1, 5, 9, 13], &[]);

        let pair = DataCleaner::default().clean_pair(train, test).unwrap();
        let step = pair.report.step(CleaningStepKind::RemediateCallType).unwrap();

        assert_eq!(step.train_remedy.unwrap().action, RemedyAction::DroppedRows);
        assert_eq!(step.test_remedy.unwrap().action, RemedyAction::FilledUnknown);
        assert_eq!(step.train_rows_removed, 1);
        assert_eq!(step.test_rows_removed, 0);
        assert_eq!(pair.train.height(), 19);
        assert_eq!(pair.test.height(), 20);
        assert_eq!(pair.test.column(CALL_TYPE).unwrap().null_count(), 0);
    }

    #[test]
    fn test_cleaning_is_a_fixed_point() {
        let df = frame(30, &[2], &[4], &[5, 6, 7, 8, 9]);
        let cleaner = DataCleaner::default();
        let (once, _) = cleaner.clean(df, DatasetKind::Train).unwrap();
        let (twice, outcome) = cleaner.clean(once.clone(), DatasetKind::Train).unwrap();

        assert!(once.equals_missing(&twice));
        assert_eq!(outcome.rows_before, outcome.rows_after);
    }

    /// One generated row: which fields are null, plus the label value.
    #[derive(Debug, Clone)]
    struct RowNulls {
        content: bool,
        label: bool,
        call_type: bool,
        strategy: bool,
        fraud_type: bool,
        fraud: bool,
    }

    fn row_nulls() -> impl Strategy<Value = RowNulls> {
        (
            prop::bool::weighted(0.1),
            prop::bool::weighted(0.1),
            prop::bool::weighted(0.15),
            prop::bool::weighted(0.15),
            prop::bool::weighted(0.5),
            any::<bool>(),
        )
            .prop_map(|(content, label, call_type, strategy, fraud_type, fraud)| RowNulls {
                content,
                label,
                call_type,
                strategy,
                fraud_type,
                fraud,
            })
    }

    fn frame_from(rows: &[RowNulls]) -> DataFrame {
        let text = |nulls: Vec<bool>, value: &str| -> Vec<Option<String>> {
            nulls
                .into_iter()
                .enumerate()
                .map(|(i, null)| (!null).then(|| format!("{value}{}", i % 3)))
                .collect()
        };
        let labels: Vec<Option<i32>> = rows
            .iter()
            .map(|r| (!r.label).then_some(r.fraud as i32))
            .collect();
        df![
            DIALOGUE_CONTENT => text(rows.iter().map(|r| r.content).collect(), "dialogue"),
            IS_FRAUD => labels,
            CALL_TYPE => text(rows.iter().map(|r| r.call_type).collect(), "call"),
            INTERACTION_STRATEGY => text(rows.iter().map(|r| r.strategy).collect(), "strategy"),
            FRAUD_TYPE => text(rows.iter().map(|r| r.fraud_type).collect(), "scam"),
        ]
        .unwrap()
    }

    proptest! {
        #[test]
        fn prop_cleaned_frames_hold_invariants(
            rows in proptest::collection::vec(row_nulls(), 1..60)
        ) {
            let cleaner = DataCleaner::default();
            let (df, outcome) = cleaner.clean(frame_from(&rows), DatasetKind::Train).unwrap();

            for column in [DIALOGUE_CONTENT, IS_FRAUD, CALL_TYPE, INTERACTION_STRATEGY, FRAUD_TYPE] {
                prop_assert_eq!(df.column(column).unwrap().null_count(), 0, "{}", column);
            }

            // a categorical step either dropped rows or filled, never both
            for kind in [CleaningStepKind::RemediateCallType, CleaningStepKind::RemediateInteractionStrategy] {
                let step = outcome.step(kind).unwrap();
                match step.remedy.unwrap().action {
                    RemedyAction::DroppedRows => prop_assert!(step.rows_removed() > 0),
                    RemedyAction::FilledUnknown => prop_assert_eq!(step.rows_removed(), 0),
                }
            }

            let labels = df.column(IS_FRAUD).unwrap().i32().unwrap();
            let fraud_types = df.column(FRAUD_TYPE).unwrap().str().unwrap();
            for (label, fraud_type) in labels.into_iter().zip(fraud_types.into_iter()) {
                if label == Some(0) {
                    prop_assert_eq!(fraud_type, Some("non_fraud"));
                }
            }

            let (again, second) = cleaner.clean(df.clone(), DatasetKind::Train).unwrap();
            prop_assert!(df.equals_missing(&again));
            prop_assert_eq!(second.rows_before, second.rows_after);
        }
    }
}
