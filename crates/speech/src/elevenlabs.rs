//! ElevenLabs text-to-speech provider
//!
//! - `POST {base}/text-to-speech/{voice_id}` with `{text, model_id}` returns MP3 bytes
//! - `GET {base}/voices` returns `{voices: [{voice_id, name}]}`
//!
//! The credential is sent in the `xi-api-key` header and is taken from each
//! request; the provider itself stores none.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use data_chef_config::constants::endpoints;
use data_chef_config::SpeechConfig;
use data_chef_core::{Credential, ProviderError, SpeechProvider, SynthesisRequest, VoiceInfo};

/// Configuration for the ElevenLabs provider
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API base URL (for testing or proxy)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: endpoints::ELEVENLABS_BASE.to_string(),
            timeout: Duration::from_millis(data_chef_config::constants::timeouts::TTS_TIMEOUT_MS),
        }
    }
}

impl ElevenLabsConfig {
    /// Set a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&SpeechConfig> for ElevenLabsConfig {
    fn from(settings: &SpeechConfig) -> Self {
        Self {
            base_url: settings.provider_base_url.clone(),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceEntry>,
}

#[derive(Debug, Deserialize)]
struct VoiceEntry {
    voice_id: String,
    #[serde(default)]
    name: String,
}

/// ElevenLabs REST provider
pub struct ElevenLabsProvider {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabsProvider {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<Vec<u8>, ProviderError> {
        let body = TtsRequest {
            text: request.text,
            model_id: request.model_id,
        };

        let response = self
            .client
            .post(self.url(&format!("text-to-speech/{}", request.voice_id)))
            .header("xi-api-key", request.credential.expose())
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse("empty audio body".to_string()));
        }

        Ok(bytes.to_vec())
    }

    async fn available_voices(
        &self,
        credential: &Credential,
    ) -> Result<Vec<VoiceInfo>, ProviderError> {
        let response = self
            .client
            .get(self.url("voices"))
            .header("xi-api-key", credential.expose())
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: VoicesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .voices
            .into_iter()
            .map(|v| VoiceInfo {
                id: v.voice_id,
                name: v.name,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "elevenlabs"
    }
}
