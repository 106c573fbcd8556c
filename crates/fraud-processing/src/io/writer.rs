//! CSV output with a single encoding fallback.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Encoding an output file was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputEncoding {
    /// UTF-8 with a byte order mark, preferred so spreadsheet tools detect it.
    #[serde(rename = "utf-8-sig")]
    Utf8Bom,
    #[serde(rename = "utf-8")]
    Utf8,
}

impl OutputEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8Bom => "utf-8-sig",
            Self::Utf8 => "utf-8",
        }
    }

    fn has_bom(&self) -> bool {
        matches!(self, Self::Utf8Bom)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetWriter;

impl DatasetWriter {
    /// Write `df` to `path` with a header row, creating parent directories.
    ///
    /// Nulls are written as empty fields and values are quoted only when
    /// needed, so text fields round-trip verbatim.
    pub fn write(&self, df: &mut DataFrame, path: &Path) -> Result<OutputEncoding> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProcessingError::Write {
                path: path.to_path_buf(),
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let encoding = write_with_fallback(path, |encoding| write_csv(df, path, encoding))?;
        info!(
            "Wrote {} rows to {} ({})",
            df.height(),
            path.display(),
            encoding.label()
        );
        Ok(encoding)
    }

    /// Write the train and test outputs so that either both land or neither does.
    ///
    /// Each frame goes to a `.partial` file next to its destination; the
    /// destinations are replaced only once both writes succeeded.
    pub fn write_pair(
        &self,
        train: (&mut DataFrame, &Path),
        test: (&mut DataFrame, &Path),
    ) -> Result<(OutputEncoding, OutputEncoding)> {
        let (train_df, train_path) = train;
        let (test_df, test_path) = test;
        let train_staged = staged_path(train_path);
        let test_staged = staged_path(test_path);

        let written = self
            .write(train_df, &train_staged)
            .and_then(|train_enc| Ok((train_enc, self.write(test_df, &test_staged)?)));

        let encodings = match written {
            Ok(encodings) => encodings,
            Err(e) => {
                discard(&train_staged);
                discard(&test_staged);
                return Err(e);
            }
        };

        commit(&train_staged, train_path)?;
        commit(&test_staged, test_path)?;
        Ok(encodings)
    }
}

fn staged_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn commit(staged: &Path, path: &Path) -> Result<()> {
    std::fs::rename(staged, path).map_err(|e| ProcessingError::Write {
        path: path.to_path_buf(),
        message: format!("cannot move {} into place: {}", staged.display(), e),
    })
}

fn discard(staged: &Path) {
    if !staged.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(staged) {
        warn!("Could not remove {}: {}", staged.display(), e);
    }
}

fn write_csv(df: &mut DataFrame, path: &Path, encoding: OutputEncoding) -> Result<()> {
    let mut file = File::create(path)?;
    if encoding.has_bom() {
        file.write_all(UTF8_BOM)?;
    }
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    file.flush()?;
    Ok(())
}

/// Try the preferred encoding, then the fallback exactly once.
pub(crate) fn write_with_fallback<F>(path: &Path, mut attempt: F) -> Result<OutputEncoding>
where
    F: FnMut(OutputEncoding) -> Result<()>,
{
    let first = match attempt(OutputEncoding::Utf8Bom) {
        Ok(()) => return Ok(OutputEncoding::Utf8Bom),
        Err(e) => e,
    };

    warn!(
        "Writing {} as {} failed ({}), retrying as {}",
        path.display(),
        OutputEncoding::Utf8Bom.label(),
        first,
        OutputEncoding::Utf8.label()
    );

    attempt(OutputEncoding::Utf8)
        .map(|()| OutputEncoding::Utf8)
        .map_err(|second| ProcessingError::Write {
            path: path.to_path_buf(),
            message: format!(
                "{}: {}; {}: {}",
                OutputEncoding::Utf8Bom.label(),
                first,
                OutputEncoding::Utf8.label(),
                second
            ),
        })
}
