//! Configuration types for the cleaning pipeline.
//!
//! Two layers:
//!
//! - [`ProjectConfig`] mirrors `config/config.toml` and names the train,
//!   test and processed-output locations relative to the project root.
//!   [`ProjectConfig::resolve`] turns it into absolute [`DataPaths`].
//! - [`PipelineConfig`] is what the [`Pipeline`](crate::Pipeline) consumes.
//!   It is built with [`PipelineConfig::builder()`] and validated on build.

use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the project configuration, relative to the root.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Null fraction below which rows are dropped instead of filled.
pub const DEFAULT_ROW_DROP_THRESHOLD: f64 = 0.10;

/// File names of the cleaned outputs.
pub const TRAIN_OUTPUT_FILE: &str = "train_cleaned.csv";
pub const TEST_OUTPUT_FILE: &str = "test_cleaned.csv";

// ============================================================================
// Project configuration (config/config.toml)
// ============================================================================

/// Contents of the project configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub data: DataSection,
}

/// The `[data]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    pub train_data: PathBuf,
    pub test_data: PathBuf,
    pub processed: PathBuf,
}

/// Resolved file-system locations used by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    pub root_dir: PathBuf,
    pub train_data: PathBuf,
    pub test_data: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        let root = PathBuf::from(".");
        Self {
            train_data: root.join("data/train.csv"),
            test_data: root.join("data/test.csv"),
            processed_dir: root.join("data/processed"),
            root_dir: root,
        }
    }
}

impl ProjectConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ProcessingError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Project root implied by a config file location.
    ///
    /// The file lives in `<root>/config/`, so the root is two levels up.
    /// Falls back to the current directory for bare file names.
    pub fn default_root_for(config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Join every configured path onto `root`. Absolute paths are kept as-is.
    pub fn resolve(&self, root: &Path) -> DataPaths {
        DataPaths {
            root_dir: root.to_path_buf(),
            train_data: root.join(&self.data.train_data),
            test_data: root.join(&self.data.test_data),
            processed_dir: root.join(&self.data.processed),
        }
    }
}

// ============================================================================
// Pipeline configuration
// ============================================================================

/// Configuration for the cleaning pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use fraud_processing::config::{PipelineConfig, ProjectConfig};
///
/// let project = ProjectConfig::load(Path::new("config/config.toml"))?;
/// let config = PipelineConfig::builder()
///     .paths(project.resolve(Path::new(".")))
///     .emit_report(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input and output locations.
    pub paths: DataPaths,

    /// Categorical columns whose null fraction is strictly between 0 and
    /// this value lose their null rows; otherwise nulls are filled.
    /// Default: 0.10 (10%)
    pub row_drop_threshold: f64,

    /// Sub-directory of the processed directory receiving the cleaned files.
    /// Default: "cleaned"
    pub output_subdir: String,

    /// Whether to write the cleaned datasets to disk.
    /// Default: true
    pub save_to_disk: bool,

    /// Whether to write a JSON run report next to the cleaned datasets.
    /// Default: false
    pub emit_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: DataPaths::default(),
            row_drop_threshold: DEFAULT_ROW_DROP_THRESHOLD,
            output_subdir: "cleaned".to_string(),
            save_to_disk: true,
            emit_report: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !(self.row_drop_threshold > 0.0 && self.row_drop_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "row_drop_threshold".to_string(),
                value: self.row_drop_threshold,
            });
        }

        if self.output_subdir.trim().is_empty() {
            return Err(ConfigValidationError::EmptyOutputDir);
        }

        Ok(())
    }

    /// Directory receiving the cleaned datasets and the report.
    pub fn output_dir(&self) -> PathBuf {
        self.paths.processed_dir.join(&self.output_subdir)
    }

    pub fn train_output_path(&self) -> PathBuf {
        self.output_dir().join(TRAIN_OUTPUT_FILE)
    }

    pub fn test_output_path(&self) -> PathBuf {
        self.output_dir().join(TEST_OUTPUT_FILE)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be greater than 0.0 and at most 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Output sub-directory must not be empty")]
    EmptyOutputDir,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    paths: Option<DataPaths>,
    row_drop_threshold: Option<f64>,
    output_subdir: Option<String>,
    save_to_disk: Option<bool>,
    emit_report: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the resolved input/output paths.
    pub fn paths(mut self, paths: DataPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Set the null fraction below which rows are dropped.
    ///
    /// # Arguments
    /// * `threshold` - Value in (0.0, 1.0] (e.g., 0.1 = 10%)
    pub fn row_drop_threshold(mut self, threshold: f64) -> Self {
        self.row_drop_threshold = Some(threshold);
        self
    }

    /// Set the sub-directory (under the processed directory) for outputs.
    pub fn output_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.output_subdir = Some(subdir.into());
        self
    }

    /// Enable or disable writing cleaned datasets to disk.
    ///
    /// When false, results are kept in memory only.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Enable or disable writing the JSON run report.
    pub fn emit_report(mut self, emit: bool) -> Self {
        self.emit_report = Some(emit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            paths: self.paths.unwrap_or_default(),
            row_drop_threshold: self
                .row_drop_threshold
                .unwrap_or(DEFAULT_ROW_DROP_THRESHOLD),
            output_subdir: self.output_subdir.unwrap_or_else(|| "cleaned".to_string()),
            save_to_disk: self.save_to_disk.unwrap_or(true),
            emit_report: self.emit_report.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
