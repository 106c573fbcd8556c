//! Run reports.
//!
//! A [`RunReport`] gathers the label summaries, quality reports, label
//! distributions and cleaning steps of one run, together with the files that
//! were read and written. It is used for:
//! - JSON output to stdout (`--json` CLI flag)
//! - `cleaning_report.json` next to the cleaned datasets (`--emit-report`)
//! - the plain-text summary printed after a run
//!
//! # Example
//!
//! ```rust,ignore
//! use fraud_processing::reporting::ReportGenerator;
//!
//! let outcome = pipeline.run()?;
//! let report = ReportGenerator::build_report(&outcome);
//! println!("{}", ReportGenerator::render_summary(&report));
//! ```

mod generator;

pub use generator::{DatasetReport, REPORT_FILE_NAME, ReportGenerator, RunReport};
