//! Conversation layer for Data Chef
//!
//! Features:
//! - Mock and remote analysis backends behind `AnalysisBackend`
//! - Backend selection from configuration
//! - Per-session orchestrator with validated input, history and speech

pub mod backend;
pub mod orchestrator;

pub use backend::{build_backend, HttpAnalysisBackend, MockAnalysisBackend};
pub use orchestrator::ConversationOrchestrator;
