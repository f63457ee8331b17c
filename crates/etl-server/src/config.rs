//! Configuration management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineSettings;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Destination store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Unset is allowed: jobs then fail at the persist stage.
    pub url: Option<String>,
    pub run_migrations: bool,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_dir: Option<PathBuf>,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    /// True when the list is empty or contains `*`
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Config {
    /// Load configuration from `.env`, the environment, and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(&lookup, key);

        let config = Config {
            server: ServerConfig {
                host: non_empty("ETL_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
                port: parsed(&lookup, "ETL_PORT").unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: parsed(&lookup, "ETL_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: non_empty("DATABASE_URL"),
                run_migrations: parsed(&lookup, "ETL_RUN_MIGRATIONS").unwrap_or(false),
            },
            pipeline: PipelineConfig {
                data_dir: non_empty("ETL_DATA_DIR").map(PathBuf::from),
            },
            cors: CorsConfig {
                allowed_origins: non_empty("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: parsed(&lookup, "CORS_ALLOW_CREDENTIALS").unwrap_or(false),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_none() {
            tracing::warn!("DATABASE_URL is not set - jobs will fail when inserting rows");
        }

        if self.database.run_migrations && self.database.url.is_none() {
            tracing::warn!("ETL_RUN_MIGRATIONS is set but there is no database to migrate");
        }

        if self.cors.allow_credentials && self.cors.allows_any_origin() {
            anyhow::bail!("CORS credentials cannot be combined with a wildcard origin");
        }

        Ok(())
    }

    /// Settings handed to the job runner
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            database_url: self.database.url.clone(),
            data_dir: self.pipeline.data_dir.clone(),
            ..PipelineSettings::default()
        }
    }
}

/// A variable's value, treating blank as unset
fn var<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// A variable parsed as `T`; unparsable values count as unset
fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(lookup, key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: None,
                run_migrations: false,
            },
            pipeline: PipelineConfig { data_dir: None },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config.server.host, DEFAULT_SERVER_HOST);
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert!(config.database.url.is_none());
        assert!(!config.database.run_migrations);
        assert_eq!(config.cors.allowed_origins, vec![DEFAULT_CORS_ALLOWED_ORIGIN]);
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("ETL_PORT", "9100"),
            ("DATABASE_URL", "postgres://etl@db/clinical"),
            ("ETL_DATA_DIR", "/srv/uploads"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.url.as_deref(), Some("postgres://etl@db/clinical"));
        assert_eq!(config.cors.allowed_origins.len(), 2);

        let settings = config.pipeline_settings();
        assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/uploads")));
        assert_eq!(settings.table, "clinical_measurements");
    }

    #[test]
    fn test_blank_database_url_is_unset() {
        let config = from_map(&[("DATABASE_URL", "   ")]).unwrap();
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = from_map(&[("ETL_PORT", "eighty")]).unwrap();
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
    }

    #[test]
    fn test_zero_port_is_rejected() {
        assert!(from_map(&[("ETL_PORT", "0")]).is_err());
    }

    #[test]
    fn test_wildcard_with_credentials_is_rejected() {
        assert!(from_map(&[
            ("CORS_ALLOWED_ORIGINS", "*"),
            ("CORS_ALLOW_CREDENTIALS", "true"),
        ])
        .is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_load_without_database_url_does_not_fail() {
        let saved = std::env::var("DATABASE_URL").ok();
        std::env::remove_var("DATABASE_URL");

        let result = Config::load();

        if let Some(url) = saved {
            std::env::set_var("DATABASE_URL", url);
        }
        // a developer .env may set it; only the absence of an error matters
        assert!(result.is_ok());
    }
}
