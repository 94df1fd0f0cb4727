//! Application configuration.
//!
//! Loaded once at startup from defaults, an optional `feedback.toml` and
//! `FEEDBACK_*` environment variables (a `.env` file is honoured), then
//! validated and handed to the parts that need it. Nothing below the
//! application entry reads the environment on its own.

use config::{ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "feedback.toml";
pub const ENV_PREFIX: &str = "FEEDBACK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Supabase,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub backend: Backend,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub table: String,
    pub submit_timeout_secs: u64,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Supabase,
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            table: "mentibyFeedback".to_string(),
            submit_timeout_secs: 30,
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: "mentiby".to_string(),
            db_user: "postgres".to_string(),
            db_password: String::new(),
        }
    }
}

impl FeedbackConfig {
    /// Reads `.env`, the config file (if present) and the environment, then validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            info!("No .env file loaded ({}), using process environment", e);
        }

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: FeedbackConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        config.log_summary();
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.trim().is_empty() {
            return Err(ConfigError::Missing("table"));
        }
        if self.table.contains('"') {
            return Err(ConfigError::Invalid {
                field: "table",
                reason: "must not contain double quotes".to_string(),
            });
        }
        if self.submit_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "submit_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        match self.backend {
            Backend::Supabase => {
                if self.supabase_url.trim().is_empty() {
                    return Err(ConfigError::Missing("supabase_url"));
                }
                let url = Url::parse(&self.supabase_url).map_err(|e| ConfigError::Invalid {
                    field: "supabase_url",
                    reason: e.to_string(),
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::Invalid {
                        field: "supabase_url",
                        reason: format!("unsupported scheme '{}'", url.scheme()),
                    });
                }
                if self.supabase_anon_key.trim().is_empty() {
                    return Err(ConfigError::Missing("supabase_anon_key"));
                }
            }
            Backend::Postgres => {
                if self.db_host.trim().is_empty() {
                    return Err(ConfigError::Missing("db_host"));
                }
                if self.db_name.trim().is_empty() {
                    return Err(ConfigError::Missing("db_name"));
                }
            }
            Backend::Memory => {
                warn!("Memory backend selected - submissions are lost on exit");
            }
        }

        Ok(())
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    fn log_summary(&self) {
        info!(
            "Configuration loaded: backend={:?}, table={}, timeout={}s",
            self.backend, self.table, self.submit_timeout_secs
        );
        match self.backend {
            Backend::Supabase => info!(
                "Supabase URL: {} (anon key length: {})",
                self.supabase_url,
                self.supabase_anon_key.len()
            ),
            Backend::Postgres => info!(
                "Database: {}@{}:{}/{} (password set: {})",
                self.db_user,
                self.db_host,
                self.db_port,
                self.db_name,
                !self.db_password.is_empty()
            ),
            Backend::Memory => {}
        }
    }
}
