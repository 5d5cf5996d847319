//! Core traits and types for Data Chef
//!
//! This crate provides foundational types used across all other crates:
//! - Analysis result and conversation history types
//! - Input, credential and speech-text validation
//! - Voice configuration with per-call credentials
//! - Pluggable backend traits (analysis, speech synthesis)
//! - Error types

pub mod analysis;
pub mod conversation;
pub mod error;
pub mod traits;
pub mod validation;
pub mod voice_config;

pub use analysis::{AnalysisDetails, AnalysisResult, AnalysisStatus};
pub use conversation::{ConversationEntry, ConversationStats, HistoryOrder};
pub use error::{
    AnalysisError, CredentialIssue, ProviderError, SpeechError, SpeechInputIssue, ValidationError,
};
pub use validation::{
    check_harmful_content, check_security_patterns, sanitize, sanitize_filename,
    validate_credential, validate_file_extension, validate_speech_text, validate_url,
    validate_voice_id, InputValidator,
};
pub use voice_config::{Credential, VoiceConfig, VoiceInfo};

// Trait re-exports
pub use traits::{AnalysisBackend, SpeechProvider, SynthesisRequest};
