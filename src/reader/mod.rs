//! Streaming reader for GeoNames tab-delimited files.
//!
//! A `FileReader` describes a file and its column schema; every call to
//! [`FileReader::open`] starts a fresh pass from the first line, so the same
//! file can be read several times. Records are produced one line at a time and
//! the file is never materialized in memory.

mod record;
mod schema;

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::error_handling::ParseError;

pub use record::Record;
pub use schema::{Schema, COUNTRY_INFO, DELETES, GEONAMES};

const COMMENT_MARKER: char = '#';
const DELIMITER: char = '\t';

/// A source file paired with its column layout.
#[derive(Debug, Clone)]
pub struct FileReader {
    path: PathBuf,
    schema: &'static Schema,
}

impl FileReader {
    pub fn new(path: impl Into<PathBuf>, schema: &'static Schema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a new pass over the file.
    pub async fn open(&self) -> Result<RecordStream, ParseError> {
        let file = File::open(&self.path).await.map_err(|source| ParseError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(RecordStream {
            lines: BufReader::new(file).lines(),
            schema: self.schema,
            path: self.path.clone(),
            line: 0,
        })
    }
}

/// Lazy sequence of records from one pass over a file.
pub struct RecordStream {
    lines: Lines<BufReader<File>>,
    schema: &'static Schema,
    path: PathBuf,
    line: usize,
}

impl RecordStream {
    /// Returns the next record, `None` at end of file.
    ///
    /// Comment and blank lines are skipped. A row with the wrong number of
    /// columns is an error: the layouts are fixed, so a mismatch means the
    /// upstream format changed.
    pub async fn next_record(&mut self) -> Result<Option<Record>, ParseError> {
        loop {
            let next = self
                .lines
                .next_line()
                .await
                .map_err(|source| ParseError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            let Some(line) = next else {
                return Ok(None);
            };
            self.line += 1;

            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }
            return parse_line(line, self.schema, &self.path, self.line).map(Some);
        }
    }
}

fn parse_line(
    line: &str,
    schema: &'static Schema,
    path: &Path,
    line_number: usize,
) -> Result<Record, ParseError> {
    let values: Vec<Option<String>> = line.split(DELIMITER).map(record::normalize).collect();
    if values.len() != schema.columns.len() {
        return Err(ParseError::ColumnCount {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            line: line_number,
            expected: schema.columns.len(),
            found: values.len(),
        });
    }
    Ok(Record::new(schema, values))
}
