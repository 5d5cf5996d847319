//! Speech synthesis traits

use async_trait::async_trait;

use crate::{Credential, ProviderError, VoiceInfo};

/// One synthesis call, fully specified
///
/// The credential travels with the request; providers keep no
/// mutable credential state of their own.
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub voice_id: &'a str,
    pub model_id: &'a str,
    pub credential: &'a Credential,
}

/// Text-to-Speech provider interface
///
/// Implementations:
/// - `ElevenLabsProvider` - ElevenLabs REST API (MP3 output)
/// - `MockSpeechProvider` - scripted responses with call counting
///
/// # Example
///
/// ```ignore
/// let provider: Arc<dyn SpeechProvider> = Arc::new(ElevenLabsProvider::new(config)?);
/// let audio = provider.synthesize(&request).await?;
/// ```
#[async_trait]
pub trait SpeechProvider: Send + Sync + 'static {
    /// Synthesize text to encoded audio bytes
    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<Vec<u8>, ProviderError>;

    /// List voices available to this credential
    async fn available_voices(&self, credential: &Credential)
        -> Result<Vec<VoiceInfo>, ProviderError>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// MIME type of the returned audio
    fn audio_format(&self) -> &str {
        "audio/mpeg"
    }
}
