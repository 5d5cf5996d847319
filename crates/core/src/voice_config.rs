//! Voice configuration types for TTS

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default ElevenLabs voice ("Bella")
pub const DEFAULT_VOICE_ID: &str = "EXAVITQu4vr4xnSDxMaL";
/// Default ElevenLabs model
pub const DEFAULT_MODEL_ID: &str = "eleven_monolingual_v1";

/// Opaque provider secret
///
/// Held in process memory only. `Debug` and `Display` are redacted and the
/// type is deliberately not `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Wrap a value read from config/env, treating blank strings as absent
    pub fn from_optional(secret: Option<&str>) -> Option<Self> {
        secret
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    /// The raw secret; only for building provider requests
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Voice configuration for a single synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConfig {
    /// Voice identifier
    pub voice_id: String,
    /// Synthesis model identifier
    pub model_id: String,
    /// Provider credential, passed per call
    pub api_key: Option<Credential>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            api_key: None,
        }
    }
}

impl VoiceConfig {
    /// Create a voice config with default voice/model and the given credential
    pub fn new(api_key: Option<Credential>) -> Self {
        Self {
            api_key,
            ..Default::default()
        }
    }

    /// Set the voice ID
    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    /// Set the model ID
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the credential
    pub fn with_api_key(mut self, api_key: Credential) -> Self {
        self.api_key = Some(api_key);
        self
    }
}

/// Voice information reported by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Voice identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_config_default() {
        let config = VoiceConfig::default();
        assert_eq!(config.voice_id, DEFAULT_VOICE_ID);
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_voice_config_builder() {
        let config = VoiceConfig::default()
            .with_voice_id("voice_2")
            .with_model_id("eleven_turbo_v2")
            .with_api_key(Credential::new("k"));

        assert_eq!(config.voice_id, "voice_2");
        assert_eq!(config.model_id, "eleven_turbo_v2");
        assert_eq!(config.api_key.unwrap().expose(), "k");
    }

    #[test]
    fn test_credential_is_redacted() {
        let cred = Credential::new("sk_live_supersecretvalue123456");
        assert!(!format!("{:?}", cred).contains("supersecret"));
        assert_eq!(cred.to_string(), "[REDACTED]");

        let config = VoiceConfig::new(Some(cred));
        assert!(!format!("{:?}", config).contains("supersecret"));
    }

    #[test]
    fn test_credential_from_optional() {
        assert!(Credential::from_optional(None).is_none());
        assert!(Credential::from_optional(Some("   ")).is_none());
        assert_eq!(
            Credential::from_optional(Some(" abc ")).unwrap().expose(),
            "abc"
        );
    }
}
