//! API configuration.
//!
//! Layered with the `config` crate, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `stockwise.toml` in the working directory, or the file named by
//!    `STOCKWISE_CONFIG` (optional)
//! 3. `STOCKWISE_*` environment variables (`STOCKWISE_HTTP_PORT`,
//!    `STOCKWISE_JWT_SECRET`, ...)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use stockwise_db::DbConfig;
use stockwise_engine::EngineConfig;

const DEFAULT_CONFIG_FILE: &str = "stockwise.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub http_host: String,
    pub http_port: u16,

    /// SQLite database file.
    pub database_path: PathBuf,
    pub database_max_connections: u32,

    /// HS256 signing secret. Required.
    pub jwt_secret: String,
    /// Lifetime of tokens issued by [`crate::auth::JwtManager::issue`].
    pub jwt_lifetime_secs: i64,

    /// Deadline for one checkout, sync batch or inventory operation.
    pub request_timeout_secs: u64,
    pub invoice_prefix: String,
    pub invoice_tax_rate_bps: u32,
    pub max_sync_batch_size: usize,
}

impl ApiConfig {
    /// Loads from defaults, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var("STOCKWISE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(Some(file))
    }

    pub fn load_from(file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("http_host", "0.0.0.0")?
            .set_default("http_port", 8080)?
            .set_default("database_path", "./stockwise.db")?
            .set_default("database_max_connections", 5)?
            .set_default("jwt_secret", "")?
            .set_default("jwt_lifetime_secs", 3600)?
            .set_default("request_timeout_secs", 30)?
            .set_default("invoice_prefix", "INV")?
            .set_default("invoice_tax_rate_bps", 0)?
            .set_default("max_sync_batch_size", 500)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config: ApiConfig = builder
            .add_source(Environment::with_prefix("STOCKWISE").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_lifetime_secs".to_string()));
        }
        self.engine_config()
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.database_max_connections)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .invoice_prefix(self.invoice_prefix.clone())
            .invoice_tax_rate_bps(self.invoice_tax_rate_bps)
            .max_sync_batch_size(self.max_sync_batch_size)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
