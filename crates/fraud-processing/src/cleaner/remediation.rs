//! Column-level remediation helpers used by [`DataCleaner`](super::DataCleaner).

use crate::error::Result;
use crate::schema::{FRAUD_TYPE, IS_FRAUD, NON_FRAUD_TYPE, UNKNOWN_CATEGORY, UNKNOWN_FRAUD_TYPE};
use crate::types::{ColumnRemedy, RemedyAction};
use crate::utils::{as_string_series, drop_null_rows, fill_string_nulls, null_fraction};
use polars::prelude::*;
use tracing::debug;

/// Drop or fill the nulls of one categorical column.
///
/// The null fraction is measured on `df` as it is now. A fraction strictly
/// between 0 and `threshold` removes the null rows; anything else (no nulls,
/// or at least `threshold`) fills them with `"unknown"`.
pub(crate) fn remediate_categorical(
    df: DataFrame,
    column: &str,
    threshold: f64,
) -> Result<(DataFrame, ColumnRemedy)> {
    let fraction = null_fraction(&df, column)?.unwrap_or(0.0);

    if fraction > 0.0 && fraction < threshold {
        let (df, removed) = drop_null_rows(df, column)?;
        debug!(
            "Dropped {} rows with missing '{}' ({:.2}% null)",
            removed,
            column,
            fraction * 100.0
        );
        return Ok((
            df,
            ColumnRemedy {
                action: RemedyAction::DroppedRows,
                null_fraction: fraction,
            },
        ));
    }

    let mut df = df;
    let filled = fill_string_nulls(df.column(column)?.as_materialized_series(), UNKNOWN_CATEGORY)?;
    df.replace(column, filled)?;
    debug!(
        "Filled missing '{}' with '{}' ({:.2}% null)",
        column,
        UNKNOWN_CATEGORY,
        fraction * 100.0
    );

    Ok((
        df,
        ColumnRemedy {
            action: RemedyAction::FilledUnknown,
            null_fraction: fraction,
        },
    ))
}

/// Counts of `fraud_type` values rewritten by [`reconcile_fraud_type`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FraudTypeChanges {
    pub marked_non_fraud: usize,
    pub filled_unknown: usize,
}

/// Force `fraud_type = "non_fraud"` on every non-fraud row, then fill any
/// remaining null with `"unknown_fraud"`.
pub(crate) fn reconcile_fraud_type(df: &mut DataFrame) -> Result<FraudTypeChanges> {
    let labels = df
        .column(IS_FRAUD)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    let fraud_types = as_string_series(df.column(FRAUD_TYPE)?.as_materialized_series())?;

    let mut changes = FraudTypeChanges::default();
    let reconciled: Vec<String> = labels
        .i32()?
        .into_iter()
        .zip(fraud_types.str()?.into_iter())
        .map(|(label, fraud_type)| match (label, fraud_type) {
            (Some(0), current) => {
                if current != Some(NON_FRAUD_TYPE) {
                    changes.marked_non_fraud += 1;
                }
                NON_FRAUD_TYPE.to_string()
            }
            (_, Some(current)) => current.to_string(),
            (_, None) => {
                changes.filled_unknown += 1;
                UNKNOWN_FRAUD_TYPE.to_string()
            }
        })
        .collect();

    df.replace(FRAUD_TYPE, Series::new(FRAUD_TYPE.into(), reconciled))?;
    Ok(changes)
}
