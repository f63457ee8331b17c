//! Row cleaning and validity classification
//!
//! Cleaning trims every cell and turns null markers into real nulls. A row is
//! invalid when any required column is missing. The invalid count and the
//! valid subset come from the same predicate, [`is_missing`], so a row can
//! never be both counted invalid and persisted.

use etl_common::REQUIRED_FIELDS;

use super::rowset::{Row, RowSet};

/// Cell text treated as null once trimmed.
pub const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_null_marker(text: &str) -> bool {
    NULL_MARKERS.contains(&text)
}

/// True if a required value is absent, blank, or a null marker.
pub fn is_missing(cell: Option<&str>) -> bool {
    match cell {
        None => true,
        Some(text) => {
            let text = text.trim();
            text.is_empty() || is_null_marker(text)
        },
    }
}

/// Result of cleaning a row set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// Rows with every required value present
    pub valid: RowSet,
    pub invalid_count: usize,
    pub total_count: usize,
}

/// Trim every cell in place. Cells that end up blank or a null marker become
/// nulls. Applying this twice gives the same result as applying it once.
pub fn trim_cells(rows: &mut RowSet) {
    for row in rows.rows_mut().iter_mut() {
        for cell in row.iter_mut() {
            let Some(text) = cell.as_deref() else {
                continue;
            };
            if is_missing(Some(text)) {
                *cell = None;
            } else {
                let trimmed = text.trim();
                if trimmed.len() != text.len() {
                    *cell = Some(trimmed.to_string());
                }
            }
        }
    }
}

/// Clean `rows` and split off the valid subset.
///
/// A required column absent from the header makes every row invalid.
pub fn sanitize(mut rows: RowSet) -> Sanitized {
    trim_cells(&mut rows);

    let required: Vec<Option<usize>> =
        REQUIRED_FIELDS.iter().map(|field| rows.column_index(field)).collect();

    let total_count = rows.len();
    let (columns, all_rows) = rows.into_parts();
    let (valid, invalid): (Vec<Row>, Vec<Row>) = all_rows
        .into_iter()
        .partition(|row| !has_missing_required(row, &required));

    if !invalid.is_empty() {
        tracing::debug!(invalid = invalid.len(), total = total_count, "Invalid rows found");
    }

    Sanitized {
        valid: RowSet::new(columns, valid),
        invalid_count: invalid.len(),
        total_count,
    }
}

fn has_missing_required(row: &Row, required: &[Option<usize>]) -> bool {
    required.iter().any(|idx| match idx {
        Some(i) => is_missing(row.get(*i).and_then(|c| c.as_deref())),
        None => true,
    })
}
