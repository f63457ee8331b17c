//! ETL Server - Main entry point

use std::sync::Arc;

use anyhow::Result;
use etl_common::logging::{init_logging, LogConfig};
use tracing::info;

use etl_server::{
    api::{self, AppState},
    config::Config,
    db,
    pipeline::{JobRegistry, JobRunner, PostgresStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("etl-server".to_string())
        .filter_directives("etl_server=debug,tower_http=debug,sqlx=warn".to_string())
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting ETL Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    if config.database.run_migrations {
        match config.database.url.as_deref() {
            Some(url) => {
                if let Err(e) = db::run_migrations(url).await {
                    // the store may already be provisioned; jobs report their own failures
                    tracing::error!("{}", e);
                }
            },
            None => tracing::warn!("Skipping migrations: DATABASE_URL is not set"),
        }
    }

    let runner = JobRunner::new(
        JobRegistry::new(),
        Arc::new(PostgresStore),
        config.pipeline_settings(),
    );

    api::serve(config, AppState { runner }).await
}
