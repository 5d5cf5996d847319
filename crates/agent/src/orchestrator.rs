//! Per-session conversation orchestration
//!
//! One orchestrator owns one conversation: it validates input, drives the
//! analysis backend, records history and hands text to speech synthesis.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use data_chef_config::constants::messages;
use data_chef_core::{
    check_harmful_content, check_security_patterns, sanitize, AnalysisBackend, AnalysisResult,
    ConversationEntry, ConversationStats, HistoryOrder, InputValidator, SpeechError,
    ValidationError, VoiceConfig,
};
use data_chef_speech::SpeechClient;

/// Conversation orchestrator
///
/// History is append-only between clears. The write lock is only taken after
/// the backend call has completed, never across an `.await`.
pub struct ConversationOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    speech: SpeechClient,
    validator: InputValidator,
    history: RwLock<Vec<ConversationEntry>>,
    /// Entry sequence; not reset by `clear_history` so ids stay unique
    next_seq: AtomicU64,
}

impl ConversationOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>, speech: SpeechClient) -> Self {
        Self {
            backend,
            speech,
            validator: InputValidator::default(),
            history: RwLock::new(Vec::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Use custom input length bounds
    pub fn with_validator(mut self, validator: InputValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn is_mock(&self) -> bool {
        self.backend.is_mock()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn speech(&self) -> &SpeechClient {
        &self.speech
    }

    /// Analyze a raw user request
    ///
    /// Rejected input never reaches the backend. A successful analysis is
    /// appended to history as exactly one entry; an error-tagged result is
    /// returned as `Ok` but not recorded.
    pub async fn analyze(&self, raw: &str) -> Result<AnalysisResult, ValidationError> {
        let query = sanitize(raw);

        if let Err(e) = self.validator.check(&query) {
            tracing::debug!(reason = e.reason(), "Rejected analysis request");
            return Err(e);
        }

        // Checked on the raw text: sanitizing strips the `<` of `<script`
        if !check_harmful_content(raw) || !check_harmful_content(&query) {
            tracing::warn!("Rejected analysis request with harmful content");
            return Err(ValidationError::HarmfulContent);
        }

        let sensitive = check_security_patterns(&query);
        if !sensitive.is_empty() {
            tracing::warn!(
                patterns = ?sensitive,
                "Analysis request mentions credential-like terms"
            );
        }

        let started = std::time::Instant::now();
        let result = self.backend.analyze(&query).await;

        tracing::info!(
            backend = self.backend.name(),
            status = result.status.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis completed"
        );

        if result.is_error() {
            return Ok(result);
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = ConversationEntry::new(seq, query, result.clone());
        self.history.write().push(entry);

        Ok(result)
    }

    /// Synthesize arbitrary text. History is not touched.
    pub async fn speak(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>, SpeechError> {
        self.speech.synthesize(text, voice).await
    }

    /// Synthesize the latest response, or the voice-test line when there is none
    pub async fn speak_latest(&self, voice: &VoiceConfig) -> Result<Vec<u8>, SpeechError> {
        let text = self.latest_speech_text();
        self.speech.synthesize(&text, voice).await
    }

    /// Text `speak_latest` would synthesize
    pub fn latest_speech_text(&self) -> String {
        self.history
            .read()
            .last()
            .map(|e| e.assistant.speech_text().to_string())
            .unwrap_or_else(|| messages::VOICE_TEST.to_string())
    }

    /// Remove every entry, returning how many were removed
    pub fn clear_history(&self) -> usize {
        let removed = std::mem::take(&mut *self.history.write()).len();
        tracing::debug!(removed, "Conversation history cleared");
        removed
    }

    /// Copy of the most recent `limit` entries (all when `None`) in `order`
    pub fn history_snapshot(
        &self,
        limit: Option<usize>,
        order: HistoryOrder,
    ) -> Vec<ConversationEntry> {
        let history = self.history.read();
        let start = limit.map_or(0, |n| history.len().saturating_sub(n));
        let mut entries = history[start..].to_vec();
        drop(history);

        if order == HistoryOrder::NewestFirst {
            entries.reverse();
        }
        entries
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    pub fn stats(&self) -> ConversationStats {
        ConversationStats::from_entries(&self.history.read())
    }
}

impl std::fmt::Debug for ConversationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationOrchestrator")
            .field("backend", &self.backend.name())
            .field("speech", &self.speech)
            .field("validator", &self.validator)
            .field("history_len", &self.history_len())
            .finish()
    }
}
