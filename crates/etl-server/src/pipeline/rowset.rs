//! In-memory tabular data

/// A single cell. `None` is a null value.
pub type Cell = Option<String>;

/// One data row, aligned with [`RowSet::columns`].
pub type Row = Vec<Cell>;

/// Ordered rows sharing one header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RowSet {
    /// Build a row set. Every row must have exactly `columns.len()` cells.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`, or `None` when the row, the column, or
    /// the value is absent.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<String> {
        &mut self.columns
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RowSet {
        RowSet::new(
            vec!["study_id".into(), "value".into()],
            vec![
                vec![Some("S1".into()), Some("7.2".into())],
                vec![Some("S1".into()), None],
            ],
        )
    }

    #[test]
    fn test_value_lookup() {
        let rows = sample();
        assert_eq!(rows.value(0, "value"), Some("7.2"));
        assert_eq!(rows.value(1, "value"), None);
        assert_eq!(rows.value(0, "site_id"), None);
        assert_eq!(rows.value(5, "study_id"), None);
    }

    #[test]
    fn test_len() {
        let rows = sample();
        assert_eq!(rows.len(), 2);
        assert!(!rows.is_empty());
        assert!(RowSet::default().is_empty());
    }
}
