//! Destination store for accepted rows
//!
//! [`PostgresStore`] appends a row set to an existing table in a single
//! transaction. It never creates or alters the table: a missing table or
//! column fails the whole append.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use super::error::PersistError;
use super::rowset::RowSet;

/// PostgreSQL accepts at most this many bind parameters per statement.
const MAX_BIND_PARAMS: usize = 65_535;

/// Append-only sink for accepted measurement rows
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Append every row of `rows` to `table`, returning the number written.
    ///
    /// Either all rows are written or the call fails.
    async fn append(
        &self,
        database_url: &str,
        table: &str,
        rows: &RowSet,
    ) -> Result<u64, PersistError>;
}

/// Store backed by PostgreSQL through sqlx
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresStore;

#[async_trait]
impl MeasurementStore for PostgresStore {
    #[tracing::instrument(skip(self, database_url, rows), fields(rows = rows.len()))]
    async fn append(
        &self,
        database_url: &str,
        table: &str,
        rows: &RowSet,
    ) -> Result<u64, PersistError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = PgConnection::connect(database_url)
            .await
            .map_err(PersistError::Connect)?;

        let mut tx = conn.begin().await?;
        let mut written = 0u64;

        for chunk in rows.rows().chunks(rows_per_statement(rows.columns().len())) {
            let mut query_builder: QueryBuilder<Postgres> =
                QueryBuilder::new(insert_prefix(table, rows.columns()));

            query_builder.push_values(chunk, |mut b, row| {
                for cell in row {
                    b.push_bind(cell.clone());
                }
            });

            let result = query_builder.build().execute(&mut *tx).await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        tracing::info!(table, written, "Rows appended");

        Ok(written)
    }
}

fn rows_per_statement(columns: usize) -> usize {
    (MAX_BIND_PARAMS / columns.max(1)).max(1)
}

/// Quote an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn insert_prefix(table: &str, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({}) ", quote_ident(table), column_list)
}

/// Store that keeps appended rows in memory.
///
/// Useful for exercising the pipeline without a database. Can be told to
/// fail every append.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    appended: Arc<Mutex<Vec<(String, RowSet)>>>,
    failure: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose appends all fail with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            appended: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    /// Every `(table, rows)` pair appended so far, oldest first.
    pub fn appended(&self) -> Vec<(String, RowSet)> {
        self.appended
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Total rows appended across all calls.
    pub fn row_count(&self) -> usize {
        self.appended().iter().map(|(_, rows)| rows.len()).sum()
    }
}

#[async_trait]
impl MeasurementStore for InMemoryStore {
    async fn append(
        &self,
        _database_url: &str,
        table: &str,
        rows: &RowSet,
    ) -> Result<u64, PersistError> {
        if let Some(ref reason) = self.failure {
            return Err(PersistError::Unavailable(reason.clone()));
        }

        self.appended
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((table.to_string(), rows.clone()));

        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("site_id"), "\"site_id\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn test_insert_prefix() {
        let prefix = insert_prefix(
            "clinical_measurements",
            &["study_id".to_string(), "value".to_string()],
        );
        assert_eq!(
            prefix,
            "INSERT INTO \"clinical_measurements\" (\"study_id\", \"value\") "
        );
    }

    #[test]
    fn test_rows_per_statement_stays_under_limit() {
        assert_eq!(rows_per_statement(7), 9_362);
        assert!(rows_per_statement(7) * 7 <= MAX_BIND_PARAMS);
        assert_eq!(rows_per_statement(0), MAX_BIND_PARAMS);
    }

    #[tokio::test]
    async fn test_in_memory_store_records_rows() {
        let store = InMemoryStore::new();
        let rows = RowSet::new(vec!["a".into()], vec![vec![Some("1".into())]]);

        let written = store.append("unused", "t", &rows).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(store.row_count(), 1);
        assert_eq!(store.appended()[0].0, "t");
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryStore::failing("connection refused");
        let rows = RowSet::new(vec!["a".into()], vec![vec![None]]);

        let err = store.append("unused", "t", &rows).await.unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(store.row_count(), 0);
    }
}
