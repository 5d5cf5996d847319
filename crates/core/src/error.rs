//! Error types shared across crates
//!
//! Every failure that can reach the presentation layer has its own variant
//! with an actionable message. Nothing here is meant to be bubbled as a panic.

use thiserror::Error;

/// Rejected user input. Raised before any backend is contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a data analysis request")]
    Empty,

    #[error("Request is too short: at least {min} characters are required, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Request is too long: at most {max} characters are allowed, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Request contains potentially harmful content")]
    HarmfulContent,
}

impl ValidationError {
    /// Short machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::Empty => "empty",
            ValidationError::TooShort { .. } => "too_short",
            ValidationError::TooLong { .. } => "too_long",
            ValidationError::HarmfulContent => "harmful_content",
        }
    }
}

/// Why a credential string was rejected
///
/// This is a format heuristic only. A credential that passes can still be
/// refused by the provider.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialIssue {
    #[error("API key not configured. Please set your API key.")]
    Missing,

    #[error("API key appears to be a placeholder. Please use a real API key.")]
    Placeholder,

    #[error("API key appears to be too short.")]
    TooShort,
}

/// Why text was refused for speech synthesis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechInputIssue {
    #[error("Text input cannot be empty.")]
    Empty,

    #[error("Text input is too long. Maximum {max} characters allowed.")]
    TooLong { max: usize, actual: usize },

    #[error("Text input contains potentially harmful content.")]
    HarmfulContent,

    #[error("Voice identifier '{0}' is not valid.")]
    InvalidVoiceId(String),
}

/// Speech synthesis failures surfaced by `SpeechClient`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// Credential is missing or malformed; no network call was made
    #[error("Invalid speech credential: {0}")]
    InvalidCredential(CredentialIssue),

    /// Text or voice parameters were rejected locally
    #[error("Invalid speech input: {0}")]
    InvalidInput(String),

    /// The provider call failed
    #[error("Speech provider rejected request: {0}")]
    SynthesisFailed(String),
}

impl SpeechError {
    pub fn kind(&self) -> &'static str {
        match self {
            SpeechError::InvalidCredential(_) => "invalid_credential",
            SpeechError::InvalidInput(_) => "invalid_input",
            SpeechError::SynthesisFailed(_) => "synthesis_failed",
        }
    }
}

impl From<SpeechInputIssue> for SpeechError {
    fn from(issue: SpeechInputIssue) -> Self {
        SpeechError::InvalidInput(issue.to_string())
    }
}

/// Raw failure reported by a speech provider implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Analysis backend failures
///
/// Backends convert these into an error-tagged `AnalysisResult`; they never
/// cross the `AnalysisBackend` boundary as `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Failed to connect to analysis service: {0}")]
    Transport(String),

    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to read analysis response: {0}")]
    Decode(String),
}
