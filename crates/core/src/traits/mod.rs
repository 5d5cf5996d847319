//! Core traits for Data Chef
//!
//! Backends implement these traits to enable:
//! - Pluggable backends (swap the mock analyzer for a real one)
//! - Testing with counting test doubles
//! - Runtime selection based on configuration
//!
//! ```text
//! Analysis:
//!   - AnalysisBackend: query → AnalysisResult (never fails as Err)
//!
//! Speech:
//!   - SpeechProvider: text + voice + model + credential → audio bytes
//! ```

mod analysis;
mod speech;

pub use analysis::AnalysisBackend;
pub use speech::{SpeechProvider, SynthesisRequest};
