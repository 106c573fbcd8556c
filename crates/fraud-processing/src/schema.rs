//! Typed description of the dialogue dataset columns.
//!
//! Columns are still addressed by name inside a `DataFrame`, but every name
//! the cleaner touches is declared here once, together with whether the
//! column must be present. Validating a frame up front turns a missing
//! column into a [`ProcessingError::Schema`] before any row is touched.

use crate::error::{ProcessingError, Result};
use crate::types::DatasetKind;
use polars::prelude::*;

pub const DIALOGUE_CONTENT: &str = "specific_dialogue_content";
pub const IS_FRAUD: &str = "is_fraud";
pub const CALL_TYPE: &str = "call_type";
pub const INTERACTION_STRATEGY: &str = "interaction_strategy";
pub const FRAUD_TYPE: &str = "fraud_type";

/// Categorical columns remediated by the cleaner, in processing order.
pub const CATEGORICAL_COLUMNS: [&str; 2] = [CALL_TYPE, INTERACTION_STRATEGY];

/// Fill value for missing categorical values.
pub const UNKNOWN_CATEGORY: &str = "unknown";
/// `fraud_type` for every non-fraud record.
pub const NON_FRAUD_TYPE: &str = "non_fraud";
/// `fraud_type` for fraud records that carry none.
pub const UNKNOWN_FRAUD_TYPE: &str = "unknown_fraud";

/// A named column and whether datasets must provide it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub required: bool,
}

/// The known columns of a dialogue dataset.
#[derive(Debug, Clone)]
pub struct DialogueSchema {
    columns: Vec<ColumnSpec>,
}

impl Default for DialogueSchema {
    fn default() -> Self {
        Self {
            columns: vec![
                ColumnSpec {
                    name: DIALOGUE_CONTENT,
                    required: true,
                },
                ColumnSpec {
                    name: IS_FRAUD,
                    required: true,
                },
                ColumnSpec {
                    name: CALL_TYPE,
                    required: true,
                },
                ColumnSpec {
                    name: INTERACTION_STRATEGY,
                    required: true,
                },
                ColumnSpec {
                    name: FRAUD_TYPE,
                    required: false,
                },
            ],
        }
    }
}

/// Result of validating a frame: required columns are known to exist and
/// the presence of each optional column is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub dataset: DatasetKind,
    pub has_fraud_type: bool,
}

impl DialogueSchema {
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Validate `df` against the schema.
    ///
    /// Returns a schema error naming the first required column (in schema
    /// order) that is missing.
    pub fn resolve(&self, df: &DataFrame, dataset: DatasetKind) -> Result<ResolvedSchema> {
        for spec in self.columns.iter().filter(|c| c.required) {
            require_column(df, spec.name, dataset)?;
        }

        Ok(ResolvedSchema {
            dataset,
            has_fraud_type: has_column(df, FRAUD_TYPE),
        })
    }
}

/// Check whether a column with this exact name exists.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Fail with a schema error if `name` is absent.
pub fn require_column(df: &DataFrame, name: &str, dataset: DatasetKind) -> Result<()> {
    if has_column(df, name) {
        Ok(())
    } else {
        Err(ProcessingError::schema(name, dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame() -> DataFrame {
        df![
            DIALOGUE_CONTENT => ["hello"],
            IS_FRAUD => ["TRUE"],
            CALL_TYPE => ["inbound"],
            INTERACTION_STRATEGY => ["pressure"],
            FRAUD_TYPE => ["phishing"],
        ]
        .unwrap()
    }

    #[test]
    fn test_resolve_full_schema() {
        let resolved = DialogueSchema::default()
            .resolve(&full_frame(), DatasetKind::Train)
            .unwrap();
        assert!(resolved.has_fraud_type);
        assert_eq!(resolved.dataset, DatasetKind::Train);
    }

    #[test]
    fn test_fraud_type_is_optional() {
        let df = full_frame().drop(FRAUD_TYPE).unwrap();
        let resolved = DialogueSchema::default()
            .resolve(&df, DatasetKind::Test)
            .unwrap();
        assert!(!resolved.has_fraud_type);
    }

    #[test]
    fn test_missing_required_column_is_schema_error() {
        let df = full_frame().drop(INTERACTION_STRATEGY).unwrap();
        let err = DialogueSchema::default()
            .resolve(&df, DatasetKind::Test)
            .unwrap_err();

        match err {
            ProcessingError::Schema { column, dataset } => {
                assert_eq!(column, INTERACTION_STRATEGY);
                assert_eq!(dataset, DatasetKind::Test);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_only_fraud_type_is_optional() {
        let optional: Vec<_> = DialogueSchema::default()
            .columns()
            .iter()
            .filter(|c| !c.required)
            .map(|c| c.name)
            .collect();
        assert_eq!(optional, vec![FRAUD_TYPE]);
    }
}
