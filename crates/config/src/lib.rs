//! Configuration management for Data Chef
//!
//! Supports loading configuration from:
//! - TOML/YAML files under `config/`
//! - Environment variables (`DATA_CHEF__` prefix, `__` separator)
//! - Provider credentials from their conventional variables
//!   (`ELEVENLABS_API_KEY`, `MOTHER_DUCK_API_KEY`, `MOTHER_DUCK_DATABASE_URL`)
//! - A `.env` file in the working directory

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, AnalysisConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, SpeechConfig, ValidationConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
