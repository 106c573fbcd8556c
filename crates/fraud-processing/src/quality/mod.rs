//! Data quality diagnostics module.
//!
//! Read-only passes over a dataset: per-column null frequencies and the
//! distribution of the `is_fraud` label. Nothing here feeds back into the
//! cleaning decisions.

mod analyzer;

pub use analyzer::DataQualityAnalyzer;
