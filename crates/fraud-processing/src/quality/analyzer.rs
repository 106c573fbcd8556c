use crate::error::Result;
use crate::schema::{IS_FRAUD, require_column};
use crate::types::{ColumnNullStats, DatasetKind, LabelDistribution, QualityReport};
use crate::utils::{as_string_series, percentage};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Count nulls in every column, in schema order.
    pub fn null_report(df: &DataFrame, dataset: DatasetKind) -> QualityReport {
        let row_count = df.height();
        let columns = df
            .get_columns()
            .iter()
            .map(|col| {
                let null_count = col.null_count();
                ColumnNullStats {
                    column: col.name().to_string(),
                    null_count,
                    null_percentage: percentage(null_count, row_count),
                }
            })
            .collect::<Vec<_>>();

        for stats in &columns {
            debug!(
                "[{}] {}: {} nulls ({:.2}%)",
                dataset, stats.column, stats.null_count, stats.null_percentage
            );
        }

        QualityReport {
            dataset,
            row_count,
            columns,
        }
    }

    /// Frequency of each distinct `is_fraud` value (nulls excluded).
    ///
    /// The balance ratio `min / max` is only computed when exactly two
    /// distinct values are present.
    pub fn label_distribution(df: &DataFrame, dataset: DatasetKind) -> Result<LabelDistribution> {
        require_column(df, IS_FRAUD, dataset)?;
        let labels = as_string_series(df.column(IS_FRAUD)?.as_materialized_series())?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for value in labels.str()?.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }

        let balance_ratio = if counts.len() == 2 {
            let min = counts.values().copied().min().unwrap_or(0);
            let max = counts.values().copied().max().unwrap_or(0);
            (max > 0).then(|| min as f64 / max as f64)
        } else {
            None
        };

        debug!("[{}] is_fraud distribution: {:?}", dataset, counts);

        Ok(LabelDistribution {
            dataset,
            counts,
            balance_ratio,
        })
    }
}
