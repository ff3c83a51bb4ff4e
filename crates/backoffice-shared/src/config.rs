//! Configuration management

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub cors: CorsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

/// Which `EntityStore` adapter the server opens at startup.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
    /// Directory for the daily rolling log file. Stdout only when unset.
    pub file_dir: Option<String>,
}

impl AppConfig {
    /// Load from `config/default`, `config/{APP_ENV}` and `APP__SECTION__KEY`
    /// environment variables.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        Self::load_from(Path::new("config"), &env)
    }

    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let default_file = dir.join("default");
        let env_file = dir.join(env);

        let config = Config::builder()
            .set_default("app.env", env)?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "backoffice-server")?
            .set_default("storage.backend", "memory")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 3)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .add_source(File::from(default_file).required(false))
            .add_source(File::from(env_file).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.storage.backend == StorageBackend::Postgres
            && self.database.url.as_deref().map_or(true, str::is_empty)
        {
            return Err(AppError::ConfigError(ConfigError::Message(
                "database.url is required when storage.backend = \"postgres\"".into(),
            )));
        }
        Ok(())
    }
}
