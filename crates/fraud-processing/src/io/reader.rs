//! CSV loading with encoding detection.

use crate::error::{ProcessingError, Result};
use encoding_rs::{GBK, UTF_8};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const BOM: char = '\u{feff}';

/// Field values read as missing, in addition to empty fields.
pub const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Candidate encodings for input files, tried in [`SourceEncoding::CANDIDATES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "gbk")]
    Gbk,
    #[serde(rename = "utf-8-sig")]
    Utf8Sig,
}

impl SourceEncoding {
    pub const CANDIDATES: [SourceEncoding; 3] = [Self::Utf8, Self::Gbk, Self::Utf8Sig];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Gbk => "gbk",
            Self::Utf8Sig => "utf-8-sig",
        }
    }

    /// Decode `bytes`, returning `None` on any malformed sequence.
    ///
    /// A leading byte order mark is never part of the returned text.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        let text = match self {
            Self::Utf8 => UTF_8.decode_without_bom_handling_and_without_replacement(bytes)?,
            Self::Gbk => GBK.decode_without_bom_handling_and_without_replacement(bytes)?,
            Self::Utf8Sig => {
                let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
                if had_errors {
                    return None;
                }
                text
            }
        };
        Some(strip_bom(text))
    }
}

fn strip_bom(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix(BOM).unwrap_or(s)),
        Cow::Owned(s) => {
            if s.starts_with(BOM) {
                Cow::Owned(s[BOM.len_utf8()..].to_string())
            } else {
                Cow::Owned(s)
            }
        }
    }
}

/// A dataset read from disk together with the encoding that worked.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub path: PathBuf,
    pub encoding: SourceEncoding,
    pub df: DataFrame,
}

/// Reads delimited text files with a header row into all-text DataFrames.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetReader;

impl DatasetReader {
    /// Fail with [`ProcessingError::MissingFile`] if `path` does not exist.
    pub fn ensure_exists(&self, path: &Path) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(ProcessingError::MissingFile {
                path: path.to_path_buf(),
            })
        }
    }

    /// Read `path`, trying each candidate encoding in order.
    ///
    /// A candidate is accepted when the bytes decode cleanly and the text
    /// parses as CSV. Every column is read as `String` so values survive
    /// unchanged. Empty fields, quoted or not, and [`MISSING_TOKENS`] become
    /// nulls.
    pub fn read(&self, path: &Path) -> Result<LoadedDataset> {
        self.ensure_exists(path)?;
        let bytes = std::fs::read(path)?;

        for encoding in SourceEncoding::CANDIDATES {
            let Some(text) = encoding.decode(&bytes) else {
                debug!("{} is not valid {}", path.display(), encoding.label());
                continue;
            };

            match parse_csv(text.into_owned()) {
                Ok(df) => {
                    info!(
                        "Loaded {} ({} rows x {} columns, {})",
                        path.display(),
                        df.height(),
                        df.width(),
                        encoding.label()
                    );
                    return Ok(LoadedDataset {
                        path: path.to_path_buf(),
                        encoding,
                        df,
                    });
                }
                Err(e) => {
                    debug!(
                        "Parsing {} as {} failed: {}",
                        path.display(),
                        encoding.label(),
                        e
                    );
                }
            }
        }

        Err(ProcessingError::Decode {
            path: path.to_path_buf(),
            tried: SourceEncoding::CANDIDATES.iter().map(|e| e.label()).collect(),
        })
    }
}

fn parse_csv(text: String) -> PolarsResult<DataFrame> {
    let null_values = MISSING_TOKENS.into_iter().map(PlSmallStr::from_static).collect();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(null_values))),
        )
        .into_reader_with_file_handle(Cursor::new(text))
        .finish()?;
    null_missing_fields(df)
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || MISSING_TOKENS.contains(&value)
}

/// Null out fields the parser kept as text, such as a quoted `""`.
fn null_missing_fields(df: DataFrame) -> PolarsResult<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            let values: Vec<Option<&str>> = col
                .str()?
                .into_iter()
                .map(|v| v.filter(|s| !is_missing(s)))
                .collect();
            Ok(Series::new(col.name().clone(), values).into_column())
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_read_utf8() {
        let file = temp_file("specific_dialogue_content,is_fraud\n你好,TRUE\nhi,0\n".as_bytes());
        let loaded = DatasetReader.read(file.path()).unwrap();

        assert_eq!(loaded.encoding, SourceEncoding::Utf8);
        assert_eq!(loaded.df.height(), 2);
        let content: Vec<_> = loaded
            .df
            .column("specific_dialogue_content")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(content, vec![Some("你好"), Some("hi")]);
    }

    #[test]
    fn test_every_column_is_text() {
        let file = temp_file(b"is_fraud,score\n1,0.5\n0,1.25\n");
        let loaded = DatasetReader.read(file.path()).unwrap();
        for col in loaded.df.get_columns() {
            assert_eq!(col.dtype(), &DataType::String);
        }
        let scores: Vec<_> = loaded.df.column("score").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(scores, vec![Some("0.5"), Some("1.25")]);
    }

    #[test]
    fn test_empty_fields_are_null() {
        let file = temp_file(b"a,b\nx,\n,y\n");
        let loaded = DatasetReader.read(file.path()).unwrap();
        assert_eq!(loaded.df.column("a").unwrap().null_count(), 1);
        assert_eq!(loaded.df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_quoted_empty_and_missing_tokens_are_null() {
        let file = temp_file(
            b"specific_dialogue_content,is_fraud,call_type,interaction_strategy\n\
              \"\",1,NA,x\n\
              hi,0,NaN,None\n\
              \"NA is fine\",null,inbound,\"N/A\"\n",
        );
        let df = DatasetReader.read(file.path()).unwrap().df;

        let nulls = |name: &str| df.column(name).unwrap().null_count();
        assert_eq!(nulls("specific_dialogue_content"), 1);
        assert_eq!(nulls("is_fraud"), 1);
        assert_eq!(nulls("call_type"), 2);
        assert_eq!(nulls("interaction_strategy"), 2);

        let content: Vec<_> = df
            .column("specific_dialogue_content")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(content, vec![None, Some("hi"), Some("NA is fine")]);
    }

    #[test]
    fn test_read_gbk() {
        let (encoded, _, had_errors) = GBK.encode("specific_dialogue_content,is_fraud\n您好，我是客服,FALSE\n");
        assert!(!had_errors);
        let file = temp_file(&encoded);

        let loaded = DatasetReader.read(file.path()).unwrap();
        assert_eq!(loaded.encoding, SourceEncoding::Gbk);
        let content: Vec<_> = loaded
            .df
            .column("specific_dialogue_content")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(content, vec![Some("您好，我是客服")]);
    }

    #[test]
    fn test_bom_is_not_part_of_header() {
        let file = temp_file("\u{feff}specific_dialogue_content,is_fraud\nhello,1\n".as_bytes());
        let loaded = DatasetReader.read(file.path()).unwrap();
        assert_eq!(
            column_names(&loaded.df),
            vec!["specific_dialogue_content", "is_fraud"]
        );
    }

    #[test]
    fn test_missing_file() {
        let err = DatasetReader
            .read(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FILE");
    }

    #[test]
    fn test_undecodable_file_is_decode_error() {
        // 0xFF is invalid in UTF-8 and cannot start a GBK sequence
        let file = temp_file(&[b'a', b'\n', 0xFF, 0xFF, b'\n']);
        let err = DatasetReader.read(file.path()).unwrap_err();
        match err {
            ProcessingError::Decode { tried, .. } => {
                assert_eq!(tried, vec!["utf-8", "gbk", "utf-8-sig"]);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_candidates() {
        assert!(SourceEncoding::Utf8.decode(&[0xC3, 0x28]).is_none());
        assert_eq!(
            SourceEncoding::Utf8Sig.decode(b"\xEF\xBB\xBFabc").as_deref(),
            Some("abc")
        );
        assert_eq!(
            SourceEncoding::Utf8.decode(b"\xEF\xBB\xBFabc").as_deref(),
            Some("abc")
        );
    }
}
