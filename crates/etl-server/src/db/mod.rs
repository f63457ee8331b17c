//! Destination database housekeeping
//!
//! Job inserts open their own connection (see `pipeline::persister`); this
//! module only applies the reference schema at startup.

use sqlx::{Connection, PgConnection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Apply the reference migrations in `migrations/` to `database_url`.
pub async fn run_migrations(database_url: &str) -> DbResult<()> {
    let mut conn = PgConnection::connect(database_url).await?;
    sqlx::migrate!("../../migrations").run(&mut conn).await?;
    conn.close().await?;

    tracing::info!("Database migrations completed");
    Ok(())
}
