//! # configs
//!
//! Layered settings for the Oriana binary:
//! built-in defaults, then an optional `config/oriana.toml`, then
//! environment variables such as `ORIANA__SERVER__PORT=8080`.
//! A `.env` file in the working directory is loaded first when present.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "ORIANA";
pub const DEFAULT_CONFIG_FILE: &str = "config/oriana";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// `sqlite:oriana.db`, `sqlite::memory:`, or `memory:` for the
    /// in-process store.
    pub url: String,
}

impl DatabaseSettings {
    pub fn is_memory(&self) -> bool {
        self.url == "memory:"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
    /// Emit JSON lines instead of the human readable format.
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
    /// The `.env` file read by [`Settings::load`], if any.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

impl Settings {
    /// Loads `.env`, `config/oriana.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = dotenvy::dotenv().ok();
        let mut settings =
            Self::load_from(Path::new(DEFAULT_CONFIG_FILE), Environment::with_prefix(ENV_PREFIX).separator("__"))?;
        settings.env_file = env_file;
        Ok(settings)
    }

    /// Reports where the settings came from. Loading happens before the
    /// subscriber exists, so the binary calls this once tracing is up.
    pub fn log_sources(&self) {
        match &self.env_file {
            Some(path) => debug!(path = %path.display(), "loaded .env"),
            None => debug!("no .env file found"),
        }
        debug!(
            bind = %self.bind_addr(),
            database = %self.database.url,
            json_logs = self.log.json,
            "configuration loaded"
        );
    }

    /// Same layering as [`Settings::load`] with an explicit file and
    /// environment source, so tests do not touch the process environment.
    pub fn load_from(file: &Path, env: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "sqlite:oriana.db")?
            .set_default("log.filter", "info,oriana=debug")?
            .set_default("log.json", false)?
            .add_source(File::from(file).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
