//! Custom error types for the dialogue cleaning pipeline.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! fatal conditions of a run (missing inputs, undecodable files, schema
//! violations, failed writes) plus wrappers for the underlying libraries.
//!
//! Errors are serializable as `{code, message}` so a run report or a
//! calling tool can surface them without string matching.

use crate::types::DatasetKind;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// An input dataset does not exist.
    #[error("Input file not found: {path}")]
    MissingFile { path: PathBuf },

    /// None of the candidate encodings could decode and parse the file.
    #[error("Could not read {path} with any candidate encoding (tried {})", .tried.join(", "))]
    Decode {
        path: PathBuf,
        tried: Vec<&'static str>,
    },

    /// A cleaning step needs a column the dataset does not have.
    #[error("Required column '{column}' missing from {dataset} dataset")]
    Schema {
        column: String,
        dataset: DatasetKind,
    },

    /// Serializing a dataset failed in every output encoding.
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    /// Project configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigValidationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a schema violation.
    pub fn schema(column: impl Into<String>, dataset: DatasetKind) -> Self {
        ProcessingError::Schema {
            column: column.into(),
            dataset,
        }
    }

    /// Stable error code for callers that branch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFile { .. } => "MISSING_FILE",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::Write { .. } => "WRITE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Toml(_) => "TOML_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a schema violation (possibly wrapped in context).
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::Schema { .. } => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}
