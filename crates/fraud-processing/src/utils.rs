//! Shared Series helpers for the cleaning pipeline.
//!
//! Every dataset column is read as text, so most helpers work on the
//! `String` view of a column and cast first when handed anything else.

use polars::prelude::*;

/// Return `series` as a `String` Series, casting when necessary.
pub fn as_string_series(series: &Series) -> PolarsResult<Series> {
    if series.dtype() == &DataType::String {
        Ok(series.clone())
    } else {
        series.cast(&DataType::String)
    }
}

/// Fill null values in a Series with a constant string.
///
/// Non-null values are kept verbatim; the result is always a `String` Series.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let text = as_string_series(series)?;
    let filled: Vec<String> = text
        .str()?
        .into_iter()
        .map(|opt_val| opt_val.unwrap_or(fill_value).to_string())
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fraction (0.0 - 1.0) of null values in a column.
///
/// Returns `None` for an empty frame, where the fraction is undefined.
pub fn null_fraction(df: &DataFrame, column: &str) -> PolarsResult<Option<f64>> {
    let height = df.height();
    if height == 0 {
        return Ok(None);
    }
    let nulls = df.column(column)?.null_count();
    Ok(Some(nulls as f64 / height as f64))
}

/// Percentage (0.0 - 100.0) of `part` in `whole`, 0.0 when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Keep only the rows where `column` is not null.
///
/// Returns the filtered frame and the number of rows removed.
pub fn drop_null_rows(df: DataFrame, column: &str) -> PolarsResult<(DataFrame, usize)> {
    let before = df.height();
    let mask = df.column(column)?.as_materialized_series().is_not_null();
    let filtered = df.filter(&mask)?;
    let removed = before - filtered.height();
    Ok((filtered, removed))
}
