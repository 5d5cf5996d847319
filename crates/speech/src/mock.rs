//! Scripted speech provider for tests and offline runs

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use data_chef_core::{Credential, ProviderError, SpeechProvider, SynthesisRequest, VoiceInfo};

/// Bytes returned by a succeeding mock: an ID3 tag header followed by an
/// MPEG frame sync
pub const FAKE_MP3: &[u8] = &[
    0x49, 0x44, 0x33, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFB, 0x90, 0x64,
];

/// A mock speech provider that counts calls
pub struct MockSpeechProvider {
    call_count: AtomicUsize,
    failure: Option<String>,
    last_text: Mutex<Option<String>>,
}

impl MockSpeechProvider {
    /// A provider that always succeeds with [`FAKE_MP3`]
    pub fn new() -> Self {
        Self {
            call_count: AtomicUsize::new(0),
            failure: None,
            last_text: Mutex::new(None),
        }
    }

    /// A provider that always fails with `detail`
    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            failure: Some(detail.into()),
            ..Self::new()
        }
    }

    /// Number of times `synthesize` was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Text of the most recent `synthesize` call
    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().clone()
    }
}

impl Default for MockSpeechProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechProvider for MockSpeechProvider {
    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<Vec<u8>, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_text.lock() = Some(request.text.to_string());

        match &self.failure {
            Some(detail) => Err(ProviderError::Status {
                status: 401,
                body: detail.clone(),
            }),
            None => Ok(FAKE_MP3.to_vec()),
        }
    }

    async fn available_voices(
        &self,
        _credential: &Credential,
    ) -> Result<Vec<VoiceInfo>, ProviderError> {
        Ok(vec![
            VoiceInfo {
                id: "mock-voice-1".to_string(),
                name: "Mock Chef".to_string(),
            },
            VoiceInfo {
                id: "mock-voice-2".to_string(),
                name: "Mock Sous Chef".to_string(),
            },
        ])
    }

    fn name(&self) -> &str {
        "mock"
    }
}
