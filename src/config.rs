//! Configuration for the demo server.
//!
//! Layered loading, highest priority last:
//! 1. Default values (embedded in the structs)
//! 2. TOML configuration file (default: `config/mimebox.toml`, overridable
//!    via the `MIMEBOX_CONFIG` environment variable)
//! 3. Environment variables with the pattern `MIMEBOX__<section>__<key>`,
//!    e.g. `MIMEBOX__CONTENT__DEFAULT_CONTENT_TYPE=application/msgpack`
//!
//! A `.env` file is honored via dotenvy when present.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use config::{Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::negotiation::MediaType;

const CONFIG_ENV_VAR: &str = "MIMEBOX_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/mimebox.toml";
const ENV_PREFIX: &str = "MIMEBOX";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

/// Content negotiation settings for the demo server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Used when the request carries no usable Accept header.
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            default_content_type: default_content_type(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_content_type() -> String {
    "application/json".to_owned()
}

impl Config {
    /// Load configuration from all sources (file + environment).
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config_path = env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from_path(config_path)
    }

    /// Load configuration from a specific path. Useful for testing with
    /// custom configuration files.
    pub fn load_from_path(config_path: PathBuf) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if config_path.exists() {
            tracing::info!("loading configuration from {}", config_path.display());
            builder = builder.add_source(File::from(config_path).required(false));
        } else {
            tracing::warn!(
                "configuration file not found at {}, using defaults and environment overrides",
                config_path.display()
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let raw = &config.content.default_content_type;
    let media = MediaType::parse(raw)
        .map_err(|err| ConfigError::Validation(err.to_string()))?;
    if media.is_wildcard() {
        return Err(ConfigError::Validation(format!(
            "default content type {raw:?} must be a concrete type/subtype"
        )));
    }
    Ok(())
}
