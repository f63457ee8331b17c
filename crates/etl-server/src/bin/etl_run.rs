//! Run a single ETL job against a local file without the HTTP layer
//!
//! Prints the terminal job record as JSON and exits with status 1 when the
//! job failed.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use etl_common::{
    logging::{init_logging, LogConfig, LogLevel, LogOutput},
    JobStatus,
};
use etl_server::pipeline::{JobRegistry, JobRequest, JobRunner, PipelineSettings, PostgresStore};
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "etl-run", version, about = "Ingest one clinical measurement CSV file")]
struct Cli {
    /// CSV file to ingest
    #[arg(short, long)]
    file: String,

    /// Job id; defaults to a timestamp
    #[arg(long)]
    job_id: Option<String>,

    #[arg(long)]
    study_id: Option<String>,

    /// Destination database
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Base directory for a relative --file
    #[arg(long, env = "ETL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("etl-run".to_string())
        .build();

    // the job outcome goes to stdout either way
    let _log_guard = init_logging(&log_config).ok();

    let runner = JobRunner::new(
        JobRegistry::new(),
        Arc::new(PostgresStore),
        PipelineSettings {
            database_url: cli.database_url.filter(|url| !url.trim().is_empty()),
            data_dir: cli.data_dir,
            ..PipelineSettings::default()
        },
    );

    let job_id = cli
        .job_id
        .unwrap_or_else(|| format!("etl-{}", chrono::Utc::now().format("%Y%m%d%H%M%S%3f")));

    let job = runner
        .run(JobRequest {
            job_id,
            filename: cli.file,
            study_id: cli.study_id,
        })
        .await;

    match serde_json::to_string_pretty(&job) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!(error = %e, "Failed to serialize job");
            eprintln!("Error: {}", e);
            process::exit(1);
        },
    }

    if job.status == JobStatus::Failed {
        process::exit(1);
    }
}
