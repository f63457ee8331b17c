//! Column name normalization and required-column checks

use etl_common::REQUIRED_FIELDS;

use super::error::JobError;
use super::rowset::RowSet;

/// Canonical form of a header name: trimmed and lower-cased.
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalize every column name and verify the required columns are present.
///
/// All missing columns are reported together, in [`REQUIRED_FIELDS`] order.
pub fn validate(mut rows: RowSet) -> Result<RowSet, JobError> {
    for column in rows.columns_mut().iter_mut() {
        *column = normalize_column(column);
    }

    let mut duplicates: Vec<String> = Vec::new();
    for (i, column) in rows.columns().iter().enumerate() {
        if rows.columns()[..i].contains(column) && !duplicates.contains(column) {
            duplicates.push(column.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(JobError::DuplicateColumns(duplicates));
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| rows.column_index(field).is_none())
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(JobError::MissingColumns(missing));
    }

    Ok(rows)
}
