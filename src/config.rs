//! Configuration schema and loading.
//!
//! ```text
//! mvcblog.toml (optional)
//!     → toml + serde (every field defaults)
//!     → validate() (semantic checks)
//!     → Config, immutable for the life of the process
//! ```

use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dispatch::Cors;
use crate::i18n::Language;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub i18n: I18nConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub bind_address: String,
    /// Largest request body read, in bytes. Bigger bodies get `413`.
    pub max_body_size: usize,
    /// Path prefix the REST API is mounted under.
    pub rest_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_owned(),
            max_body_size: 1024 * 1024,
            rest_prefix: "/rest".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://mvcblog.db".to_owned() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allowed_origin: String,
    pub allowed_request_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origin: "*".to_owned(),
            allowed_request_headers: "Authorization, Content-Type".to_owned(),
        }
    }
}

impl CorsConfig {
    /// The dispatcher setting, `None` when disabled.
    pub fn to_cors(&self) -> Option<Cors> {
        self.enabled
            .then(|| Cors::new(&self.allowed_origin, &self.allowed_request_headers))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_language: Language,
}

impl Config {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        let prefix = &self.server.rest_prefix;
        if !prefix.starts_with('/') || prefix.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.rest_prefix `{prefix}` must start with `/` and not end with one"
            )));
        }
        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid("server.max_body_size must be positive".to_owned()));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_address.parse().map_err(|e| {
            ConfigError::Invalid(format!("server.bind_address `{}`: {e}", self.server.bind_address))
        })
    }
}
