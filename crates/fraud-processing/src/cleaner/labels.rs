//! Normalization of the `is_fraud` label column.

use crate::error::Result;
use crate::schema::{IS_FRAUD, require_column};
use crate::types::{DatasetKind, LabelNormalizationSummary};
use crate::utils::as_string_series;
use polars::prelude::*;
use tracing::{debug, warn};

/// Classification of one raw label value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelValue {
    Fraud,
    NotFraud,
    Missing,
    Unparseable,
}

impl LabelValue {
    /// Classify a raw label: trimmed and upper-cased, `TRUE`/`1` is fraud,
    /// `FALSE`/`0` is not.
    pub fn classify(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Missing;
        };
        match raw.trim().to_uppercase().as_str() {
            "TRUE" | "1" => Self::Fraud,
            "FALSE" | "0" => Self::NotFraud,
            _ => Self::Unparseable,
        }
    }

    /// Integer label; everything that is not recognised as fraud is `0`.
    pub fn as_label(&self) -> i32 {
        match self {
            Self::Fraud => 1,
            Self::NotFraud | Self::Missing | Self::Unparseable => 0,
        }
    }
}

/// Rewrites `is_fraud` into an `Int32` column with values in {0, 1}.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelNormalizer;

impl LabelNormalizer {
    /// Normalize the label column of `df`.
    ///
    /// Missing and unrecognised labels become `0`; the returned summary keeps
    /// them apart from genuine negatives.
    pub fn normalize(
        &self,
        df: DataFrame,
        dataset: DatasetKind,
    ) -> Result<(DataFrame, LabelNormalizationSummary)> {
        require_column(&df, IS_FRAUD, dataset)?;
        let mut df = df;

        let raw = as_string_series(df.column(IS_FRAUD)?.as_materialized_series())?;
        let mut summary = LabelNormalizationSummary {
            dataset: Some(dataset),
            ..Default::default()
        };

        let labels: Vec<i32> = raw
            .str()?
            .into_iter()
            .map(|opt_val| {
                let value = LabelValue::classify(opt_val);
                match value {
                    LabelValue::Fraud => summary.positive += 1,
                    LabelValue::NotFraud => summary.negative += 1,
                    LabelValue::Missing => summary.coerced_missing += 1,
                    LabelValue::Unparseable => summary.coerced_unparseable += 1,
                }
                value.as_label()
            })
            .collect();

        df.replace(IS_FRAUD, Series::new(IS_FRAUD.into(), labels))?;

        debug!(
            dataset = %dataset,
            positive = summary.positive,
            negative = summary.negative,
            "Normalized is_fraud labels"
        );
        if summary.coerced() > 0 {
            warn!(
                dataset = %dataset,
                missing = summary.coerced_missing,
                unparseable = summary.coerced_unparseable,
                "Coerced unrecognised is_fraud labels to 0"
            );
        }

        Ok((df, summary))
    }
}
