//! Input validation and sanitization
//!
//! Everything here is pure: no I/O, no logging, no shared state.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CredentialIssue, SpeechInputIssue, ValidationError};

/// Characters stripped by `sanitize`
const DANGEROUS_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Characters replaced by `sanitize_filename`
const FILENAME_UNSAFE_CHARS: [char; 9] = ['<', '>', ':', '"', '|', '?', '*', '\\', '/'];

/// Substrings marking a credential as a placeholder (matched lowercase)
const PLACEHOLDER_PATTERNS: [&str; 4] = ["your_", "placeholder", "example", "template"];

/// Terms that suggest a secret is being passed around (matched case-insensitively)
pub const SECURITY_PATTERNS: [&str; 8] = [
    "ELEVENLABS_API_KEY",
    "MOTHER_DUCK_API_KEY",
    "api_key",
    "password",
    "secret",
    "token",
    "key",
    "credential",
];

/// Minimum plausible credential length
pub const MIN_CREDENTIAL_LENGTH: usize = 20;

pub const DEFAULT_MIN_INPUT_CHARS: usize = 3;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1000;

static HARMFUL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<script|javascript:|data:text/html|vbscript:").expect("valid harmful pattern")
});

static VOICE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\-_]+$").expect("valid voice id pattern"));

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid url pattern"));

/// Length bounds for free-text analysis requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputValidator {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_INPUT_CHARS,
            max_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

impl InputValidator {
    pub fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    /// Check `text`, reporting why it is rejected
    ///
    /// The minimum applies to the trimmed text, the maximum to the text as
    /// given. Lengths are in characters, not bytes.
    pub fn check(&self, text: &str) -> Result<(), ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let visible = trimmed.chars().count();
        if visible < self.min_chars {
            return Err(ValidationError::TooShort {
                min: self.min_chars,
                actual: visible,
            });
        }

        let total = text.chars().count();
        if total > self.max_chars {
            return Err(ValidationError::TooLong {
                max: self.max_chars,
                actual: total,
            });
        }

        Ok(())
    }

    pub fn validate(&self, text: &str) -> bool {
        self.check(text).is_ok()
    }

    /// See [`sanitize`]
    pub fn sanitize(&self, text: &str) -> String {
        sanitize(text)
    }
}

/// Trim, then drop every `< > " ' &`
///
/// Removing an edge character can expose whitespace (`"< hi"`), so the
/// result is trimmed once more to keep `sanitize` idempotent.
pub fn sanitize(text: &str) -> String {
    let stripped: String = text
        .trim()
        .chars()
        .filter(|c| !DANGEROUS_CHARS.contains(c))
        .collect();
    stripped.trim().to_string()
}

/// `true` when `text` contains no script-injection markers
pub fn check_harmful_content(text: &str) -> bool {
    !HARMFUL_PATTERN.is_match(text)
}

/// Heuristic format check for a provider credential
///
/// Not cryptographic validation: it only rejects values that are obviously
/// unset, copied from a template, or too short to be real.
pub fn validate_credential(credential: &str) -> Result<(), CredentialIssue> {
    if credential.trim().is_empty() {
        return Err(CredentialIssue::Missing);
    }

    let lowered = credential.to_lowercase();
    if PLACEHOLDER_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return Err(CredentialIssue::Placeholder);
    }

    if credential.chars().count() < MIN_CREDENTIAL_LENGTH {
        return Err(CredentialIssue::TooShort);
    }

    Ok(())
}

/// Voice identifiers are alphanumeric with `-` and `_`
pub fn validate_voice_id(voice_id: &str) -> bool {
    !voice_id.is_empty() && VOICE_ID_PATTERN.is_match(voice_id)
}

pub fn validate_url(url: &str) -> bool {
    !url.is_empty() && URL_PATTERN.is_match(url)
}

/// Check text destined for speech synthesis
pub fn validate_speech_text(text: &str, max_chars: usize) -> Result<(), SpeechInputIssue> {
    if text.trim().is_empty() {
        return Err(SpeechInputIssue::Empty);
    }

    let actual = text.chars().count();
    if actual > max_chars {
        return Err(SpeechInputIssue::TooLong {
            max: max_chars,
            actual,
        });
    }

    if !check_harmful_content(text) {
        return Err(SpeechInputIssue::HarmfulContent);
    }

    Ok(())
}

/// Make `name` safe to use as a download filename
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FILENAME_UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Security-sensitive terms found in `content`, in `SECURITY_PATTERNS` order
pub fn check_security_patterns(content: &str) -> Vec<&'static str> {
    let lowered = content.to_lowercase();
    SECURITY_PATTERNS
        .iter()
        .copied()
        .filter(|p| lowered.contains(&p.to_lowercase()))
        .collect()
}

/// `true` when `filename` ends with one of `allowed` (case-insensitive)
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> bool {
    if filename.is_empty() {
        return false;
    }
    let lowered = filename.to_lowercase();
    allowed
        .iter()
        .any(|ext| lowered.ends_with(&ext.to_lowercase()))
}
