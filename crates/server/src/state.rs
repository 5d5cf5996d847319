//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;

use data_chef_agent::{build_backend, ConversationOrchestrator};
use data_chef_config::Settings;
use data_chef_core::{AnalysisBackend, Credential, InputValidator, VoiceConfig};
use data_chef_speech::{ElevenLabsConfig, ElevenLabsProvider, SpeechClient};

use crate::session::SessionManager;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// Analysis backend shared by every session
    pub backend: Arc<dyn AnalysisBackend>,
    /// Speech client shared by every session
    pub speech: SpeechClient,
    /// Speech credential from configuration, if any
    speech_credential: Option<Credential>,
    /// Prometheus handle; `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from settings with the configured analysis backend and
    /// the ElevenLabs provider
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let backend =
            build_backend(&config.analysis).map_err(|e| ServerError::Internal(e.to_string()))?;

        let provider = ElevenLabsProvider::new(ElevenLabsConfig::from(&config.speech))
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let speech = SpeechClient::new(Arc::new(provider))
            .with_max_text_length(config.speech.max_text_length);

        Ok(Self::with_components(config, backend, speech))
    }

    /// Build state around explicit components
    pub fn with_components(
        config: Settings,
        backend: Arc<dyn AnalysisBackend>,
        speech: SpeechClient,
    ) -> Self {
        let sessions = SessionManager::with_config(
            config.server.max_sessions,
            Duration::from_secs(config.server.session_timeout_seconds),
            Duration::from_secs(config.server.cleanup_interval_seconds),
        );
        let speech_credential = Credential::from_optional(config.speech.api_key.as_deref());

        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            backend,
            speech,
            speech_credential,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Fresh orchestrator for a new session
    pub fn new_orchestrator(&self) -> ConversationOrchestrator {
        let validation = &self.config.validation;
        ConversationOrchestrator::new(self.backend.clone(), self.speech.clone()).with_validator(
            InputValidator::new(validation.min_input_chars, validation.max_input_chars),
        )
    }

    /// Voice settings from configuration, including the configured credential
    pub fn default_voice(&self) -> VoiceConfig {
        VoiceConfig {
            voice_id: self.config.speech.default_voice_id.clone(),
            model_id: self.config.speech.default_model_id.clone(),
            api_key: self.speech_credential.clone(),
        }
    }

    pub fn speech_credential(&self) -> Option<&Credential> {
        self.speech_credential.as_ref()
    }
}
