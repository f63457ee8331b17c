//! Delimited file reader
//!
//! Parses a comma-separated file whose first record is the header. Cell text
//! is kept exactly as written; trimming happens in the sanitizer. Empty cells
//! are read as nulls. A record shorter than the header is padded with nulls;
//! one longer than the header fails the file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use super::error::JobError;
use super::rowset::{Row, RowSet};

/// Read `path` into a [`RowSet`].
///
/// # Errors
///
/// - [`JobError::Read`] if the file is missing, not UTF-8, has no header, or
///   has a row wider than the header
/// - [`JobError::EmptyData`] if the header is followed by no data rows
pub fn read_rowset(path: &Path) -> Result<RowSet, JobError> {
    let file = File::open(path).map_err(|e| JobError::read(path, e))?;
    let rows = parse_rowset(file).map_err(|reason| JobError::read(path, reason))?;

    if rows.is_empty() {
        return Err(JobError::EmptyData);
    }

    tracing::debug!(
        path = %path.display(),
        columns = rows.columns().len(),
        rows = rows.len(),
        "Parsed tabular file"
    );
    Ok(rows)
}

/// Parse delimited text from any reader. Does not reject zero-row input.
pub fn parse_rowset<R: Read>(input: R) -> Result<RowSet, ParseFailure> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(input);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
        return Err(ParseFailure::NoHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(ParseFailure::TooManyFields {
                line: record.position().map_or(0, |p| p.line()),
                expected: columns.len(),
                found: record.len(),
            });
        }

        let mut row: Row = record
            .iter()
            .map(|field| (!field.is_empty()).then(|| field.to_string()))
            .collect();
        row.resize(columns.len(), None);
        rows.push(row);
    }

    Ok(RowSet::new(columns, rows))
}

/// Why a file could not be parsed
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("file has no header row")]
    NoHeader,

    #[error("line {line} has {found} fields, header has {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
