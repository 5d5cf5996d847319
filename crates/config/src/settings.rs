//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, env_vars, speech, timeouts};
use crate::ConfigError;
use data_chef_core::validation::{
    validate_url, DEFAULT_MAX_INPUT_CHARS, DEFAULT_MIN_INPUT_CHARS,
};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Speech synthesis configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Analysis backend configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Input validation bounds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_speech()?;
        self.validate_analysis()?;
        self.validate_bounds()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_sessions".to_string(),
                message: "Max sessions must be at least 1".to_string(),
            });
        }

        if server.session_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.session_timeout_seconds".to_string(),
                message: "Session timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }

    fn validate_speech(&self) -> Result<(), ConfigError> {
        let speech = &self.speech;

        if !validate_url(&speech.provider_base_url) {
            return Err(ConfigError::InvalidValue {
                field: "speech.provider_base_url".to_string(),
                message: format!("Not a valid http(s) URL: {}", speech.provider_base_url),
            });
        }

        if speech.max_text_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "speech.max_text_length".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if speech.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "speech.timeout_ms".to_string(),
                message: "Must be at least 1ms".to_string(),
            });
        }

        if speech.api_key.is_none() {
            if self.environment.is_strict() {
                tracing::warn!("No speech provider API key configured; voice generation will fail");
            } else {
                tracing::debug!("No speech provider API key configured");
            }
        }

        Ok(())
    }

    fn validate_analysis(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;

        if let Some(url) = &analysis.backend_url {
            if !validate_url(url) {
                return Err(ConfigError::InvalidValue {
                    field: "analysis.backend_url".to_string(),
                    message: format!("Not a valid http(s) URL: {}", url),
                });
            }
        }

        if analysis.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analysis.timeout_ms".to_string(),
                message: "Must be at least 1ms".to_string(),
            });
        }

        if !analysis.mock_mode && analysis.backend_url.is_none() {
            tracing::warn!(
                "analysis.mock_mode is false but no backend URL is configured; \
                 the mock backend will be used"
            );
        }

        Ok(())
    }

    fn validate_bounds(&self) -> Result<(), ConfigError> {
        let v = &self.validation;

        if v.min_input_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "validation.min_input_chars".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if v.min_input_chars > v.max_input_chars {
            return Err(ConfigError::InvalidValue {
                field: "validation.min_input_chars".to_string(),
                message: format!(
                    "Cannot be larger than validation.max_input_chars ({})",
                    v.max_input_chars
                ),
            });
        }

        Ok(())
    }

    /// Overlay provider credentials from their conventional variables
    ///
    /// `ELEVENLABS_API_KEY`, `MOTHER_DUCK_API_KEY` and
    /// `MOTHER_DUCK_DATABASE_URL` win over file values when set and non-blank.
    pub fn apply_provider_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = read(env_vars::ELEVENLABS_API_KEY) {
            self.speech.api_key = Some(key);
        }
        if let Some(key) = read(env_vars::MOTHER_DUCK_API_KEY) {
            self.analysis.backend_api_key = Some(key);
        }
        if let Some(url) = read(env_vars::MOTHER_DUCK_DATABASE_URL) {
            self.analysis.backend_url = Some(url);
        }
    }

    /// Whether the real (non-mock) analysis backend should be used
    pub fn uses_remote_analysis(&self) -> bool {
        !self.analysis.mock_mode && self.analysis.backend_url.is_some()
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum concurrent browser sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time after which a session is dropped
    #[serde(default = "default_session_timeout")]
    pub session_timeout_seconds: u64,

    /// How often idle sessions are swept
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_sessions() -> usize {
    100
}
fn default_session_timeout() -> u64 {
    3600
}
fn default_cleanup_interval() -> u64 {
    300
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            max_sessions: default_max_sessions(),
            session_timeout_seconds: default_session_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

/// Speech synthesis configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Provider REST base URL
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Voice used when a request names none
    #[serde(default = "default_voice_id")]
    pub default_voice_id: String,

    /// Model used when a request names none
    #[serde(default = "default_model_id")]
    pub default_model_id: String,

    /// Maximum characters per synthesis call
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Provider request timeout
    #[serde(default = "default_speech_timeout")]
    pub timeout_ms: u64,

    /// Provider API key (prefer ELEVENLABS_API_KEY)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_provider_base_url() -> String {
    endpoints::ELEVENLABS_BASE.to_string()
}
fn default_voice_id() -> String {
    speech::DEFAULT_VOICE_ID.to_string()
}
fn default_model_id() -> String {
    speech::DEFAULT_MODEL_ID.to_string()
}
fn default_max_text_length() -> usize {
    speech::MAX_TEXT_LENGTH
}
fn default_speech_timeout() -> u64 {
    timeouts::TTS_TIMEOUT_MS
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider_base_url: default_provider_base_url(),
            default_voice_id: default_voice_id(),
            default_model_id: default_model_id(),
            max_text_length: default_max_text_length(),
            timeout_ms: default_speech_timeout(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("provider_base_url", &self.provider_base_url)
            .field("default_voice_id", &self.default_voice_id)
            .field("default_model_id", &self.default_model_id)
            .field("max_text_length", &self.max_text_length)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Analysis backend configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Serve canned responses instead of calling a backend
    #[serde(default = "default_true")]
    pub mock_mode: bool,

    /// Simulated latency of the mock backend
    #[serde(default = "default_mock_latency")]
    pub simulated_latency_ms: u64,

    /// Real analytics backend (prefer MOTHER_DUCK_DATABASE_URL)
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Backend credential (prefer MOTHER_DUCK_API_KEY)
    #[serde(default, skip_serializing)]
    pub backend_api_key: Option<String>,

    /// Backend request timeout
    #[serde(default = "default_analysis_timeout")]
    pub timeout_ms: u64,
}

fn default_mock_latency() -> u64 {
    timeouts::MOCK_LATENCY_MS
}
fn default_analysis_timeout() -> u64 {
    timeouts::ANALYSIS_TIMEOUT_MS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mock_mode: true,
            simulated_latency_ms: default_mock_latency(),
            backend_url: None,
            backend_api_key: None,
            timeout_ms: default_analysis_timeout(),
        }
    }
}

impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("mock_mode", &self.mock_mode)
            .field("simulated_latency_ms", &self.simulated_latency_ms)
            .field("backend_url", &self.backend_url)
            .field("backend_api_key", &self.backend_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Input validation bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_min_input_chars")]
    pub min_input_chars: usize,

    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

fn default_min_input_chars() -> usize {
    DEFAULT_MIN_INPUT_CHARS
}
fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_input_chars: default_min_input_chars(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Provider variables (ELEVENLABS_API_KEY, MOTHER_DUCK_*)
/// 2. Environment variables (DATA_CHEF__ prefix, `__` separator)
/// 3. config/{env}.toml|yaml (if env specified)
/// 4. config/default.toml|yaml
///
/// A `.env` file in the working directory is loaded first if present.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Same as [`load_settings`] with an explicit config directory
pub fn load_settings_from(config_dir: &str, env: Option<&str>) -> Result<Settings, ConfigError> {
    // Missing .env is the normal case
    let _ = dotenvy::dotenv();

    let mut builder = Config::builder();

    builder =
        builder.add_source(File::with_name(&format!("{}/default", config_dir)).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(
            File::with_name(&format!("{}/{}", config_dir, env_name)).required(false),
        );
    }

    builder = builder.add_source(
        Environment::with_prefix("DATA_CHEF")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut settings: Settings = config.try_deserialize()?;

    settings.apply_provider_env(|name| std::env::var(name).ok());

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert!(settings.analysis.mock_mode);
        assert_eq!(settings.analysis.simulated_latency_ms, 1000);
        assert_eq!(settings.speech.max_text_length, 1000);
        assert_eq!(settings.speech.default_voice_id, "EXAVITQu4vr4xnSDxMaL");
        assert_eq!(settings.validation.min_input_chars, 3);
        assert!(settings.speech.api_key.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.server.max_sessions = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("server.max_sessions"));
    }

    #[test]
    fn test_bounds_validation() {
        let mut settings = Settings::default();
        settings.validation.min_input_chars = 50;
        settings.validation.max_input_chars = 10;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_backend_url_validation() {
        let mut settings = Settings::default();
        settings.analysis.backend_url = Some("not a url".to_string());
        assert!(settings.validate().is_err());

        settings.analysis.backend_url = Some("https://api.motherduck.com/query".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_provider_env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("ELEVENLABS_API_KEY", "a8F3kLm92QwErT5yUi0pZx7Cv4Bn6Mj1"),
            ("MOTHER_DUCK_API_KEY", "   "),
            ("MOTHER_DUCK_DATABASE_URL", "https://md.example.net/q"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.analysis.backend_api_key = Some("from-file".to_string());
        settings.apply_provider_env(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(
            settings.speech.api_key.as_deref(),
            Some("a8F3kLm92QwErT5yUi0pZx7Cv4Bn6Mj1")
        );
        // Blank values do not clobber
        assert_eq!(settings.analysis.backend_api_key.as_deref(), Some("from-file"));
        assert_eq!(
            settings.analysis.backend_url.as_deref(),
            Some("https://md.example.net/q")
        );
        assert!(!settings.uses_remote_analysis());

        settings.analysis.mock_mode = false;
        assert!(settings.uses_remote_analysis());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let mut settings = Settings::default();
        settings.speech.api_key = Some("sk_secret_value_0123456789".to_string());
        settings.analysis.backend_api_key = Some("md_secret_value_0123456789".to_string());
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("sk_secret"));
        assert!(!debug.contains("md_secret"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("default.toml")).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[analysis]
simulated_latency_ms = 5
"#
        )
        .unwrap();

        let settings = load_settings_from(dir.path().to_str().unwrap(), None).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.analysis.simulated_latency_ms, 5);
        assert!(settings.analysis.mock_mode);
    }

    #[test]
    fn test_environment_strictness() {
        assert!(!RuntimeEnvironment::Development.is_strict());
        assert!(RuntimeEnvironment::Staging.is_strict());
        assert!(RuntimeEnvironment::Production.is_production());
    }
}
