//! Reading and writing dialogue datasets as delimited text.
//!
//! - [`DatasetReader`] tries a fixed list of encodings until one decodes and
//!   parses, reading every column as text.
//! - [`DatasetWriter`] writes UTF-8 with a BOM and retries once in plain
//!   UTF-8 if that fails.

mod reader;
mod writer;

pub use reader::{DatasetReader, LoadedDataset, MISSING_TOKENS, SourceEncoding};
pub use writer::{DatasetWriter, OutputEncoding};
