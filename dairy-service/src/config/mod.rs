use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct DairyConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Endpoint of the external notification collaborator.
    pub endpoint: String,
    pub enabled: bool,
}

impl DairyConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(DairyConfig {
            common,
            service_name: "dairy-service".to_string(),
            log_level: core_config::get_env("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            database: DatabaseConfig {
                url: core_config::get_env("DATABASE_URL", None)?,
                max_connections: core_config::get_env("DATABASE_MAX_CONNECTIONS", Some("10"))?
                    .parse()
                    .unwrap_or(10),
                min_connections: core_config::get_env("DATABASE_MIN_CONNECTIONS", Some("1"))?
                    .parse()
                    .unwrap_or(1),
            },
            notifier: NotifierConfig {
                endpoint: core_config::get_env("NOTIFIER_ENDPOINT", Some(""))?,
                enabled: env::var("NOTIFIER_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
        })
    }
}
