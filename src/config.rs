//! Configuration management for the circulation server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::Validate;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// When set, logs are also written to a daily-rolling file in this directory
    #[serde(default)]
    pub directory: Option<String>,
}

/// Circulation policy knobs
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct CirculationConfig {
    /// Days between borrow date and due date
    #[validate(range(min = 1, max = 3650, message = "loan_period_days must be between 1 and 3650"))]
    pub loan_period_days: i64,
    /// Fine charged per full day late
    #[validate(range(min = 0, message = "daily_fine must not be negative"))]
    pub daily_fine: i64,
    /// Maximum simultaneous open loans per borrower (unlimited when absent)
    #[serde(default)]
    #[validate(range(min = 1, message = "max_active_loans must be at least 1"))]
    pub max_active_loans: Option<usize>,
    /// Load the demo catalog on startup
    #[serde(default)]
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub circulation: CirculationConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // CIRCULATION_SERVER__PORT, CIRCULATION_CIRCULATION__DAILY_FINE, ...
            .add_source(
                Environment::with_prefix("CIRCULATION")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            daily_fine: 5000,
            max_active_loans: None,
            seed_demo_data: false,
        }
    }
}
