//! Validating front end over a speech provider

use std::sync::Arc;

use data_chef_config::constants::{messages, speech::MAX_TEXT_LENGTH};
use data_chef_core::{
    validate_credential, validate_speech_text, validate_voice_id, Credential, CredentialIssue,
    ProviderError, SpeechError, SpeechInputIssue, SpeechProvider, SynthesisRequest, VoiceConfig,
    VoiceInfo,
};

/// Speech client
///
/// Holds no credential of its own. Every call carries a [`VoiceConfig`],
/// so one client can serve sessions with different keys.
#[derive(Clone)]
pub struct SpeechClient {
    provider: Arc<dyn SpeechProvider>,
    max_text_length: usize,
}

impl SpeechClient {
    pub fn new(provider: Arc<dyn SpeechProvider>) -> Self {
        Self {
            provider,
            max_text_length: MAX_TEXT_LENGTH,
        }
    }

    /// Override the per-call character limit
    pub fn with_max_text_length(mut self, max_text_length: usize) -> Self {
        self.max_text_length = max_text_length;
        self
    }

    pub fn max_text_length(&self) -> usize {
        self.max_text_length
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// MIME type of the bytes returned by [`synthesize`](Self::synthesize)
    pub fn audio_format(&self) -> &str {
        self.provider.audio_format()
    }

    /// Synthesize `text` with the voice, model and credential in `voice`
    ///
    /// Checks run in order: credential, voice id, text. Any local rejection
    /// returns before the provider is contacted. Provider failures are not
    /// retried.
    pub async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceConfig,
    ) -> Result<Vec<u8>, SpeechError> {
        let credential = checked_credential(voice)?;

        if !validate_voice_id(&voice.voice_id) {
            return Err(SpeechInputIssue::InvalidVoiceId(voice.voice_id.clone()).into());
        }

        validate_speech_text(text, self.max_text_length)?;

        let request = SynthesisRequest {
            text,
            voice_id: &voice.voice_id,
            model_id: &voice.model_id,
            credential,
        };

        tracing::debug!(
            provider = self.provider.name(),
            voice_id = %voice.voice_id,
            chars = text.chars().count(),
            "Synthesizing speech"
        );

        match self.provider.synthesize(&request).await {
            Ok(audio) => {
                tracing::info!(
                    provider = self.provider.name(),
                    bytes = audio.len(),
                    "Speech synthesized"
                );
                Ok(audio)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Speech synthesis failed"
                );
                Err(provider_failure(&e))
            }
        }
    }

    /// List voices available to the credential in `voice`
    pub async fn voices(&self, voice: &VoiceConfig) -> Result<Vec<VoiceInfo>, SpeechError> {
        let credential = checked_credential(voice)?;

        self.provider
            .available_voices(credential)
            .await
            .map_err(|e| provider_failure(&e))
    }

    /// Human-readable provider configuration state
    pub fn status_message(credential: Option<&Credential>) -> &'static str {
        if credential.is_some() {
            "ElevenLabs configured"
        } else {
            "ElevenLabs not configured"
        }
    }
}

impl std::fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechClient")
            .field("provider", &self.provider.name())
            .field("max_text_length", &self.max_text_length)
            .finish()
    }
}

/// Prefix provider failures with the matching user-facing hint
fn provider_failure(err: &ProviderError) -> SpeechError {
    let hint = match err {
        ProviderError::Network(_) => messages::CONNECTION_FAILED,
        _ => messages::VOICE_GENERATION_FAILED,
    };
    SpeechError::SynthesisFailed(format!("{} {}", hint, err))
}

fn checked_credential(voice: &VoiceConfig) -> Result<&Credential, SpeechError> {
    let credential = voice
        .api_key
        .as_ref()
        .ok_or(SpeechError::InvalidCredential(CredentialIssue::Missing))?;

    validate_credential(credential.expose()).map_err(SpeechError::InvalidCredential)?;

    Ok(credential)
}
