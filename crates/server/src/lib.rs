//! Data Chef Server
//!
//! Serves the single-page UI and the JSON/audio HTTP API over per-session
//! conversation orchestrators.

pub mod http;
pub mod metrics;
pub mod session;
pub mod state;

pub use http::create_router;
pub use metrics::{
    init_metrics, record_analysis_latency, record_request, record_speech_latency,
};
pub use session::{Session, SessionManager};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use data_chef_core::{SpeechError, ValidationError};

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Max sessions reached")]
    SessionLimit,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Speech(#[from] SpeechError),

    #[error("{0}")]
    AnalysisFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Machine-readable error kind used in response bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::SessionNotFound(_) => "session_not_found",
            ServerError::SessionLimit => "session_limit",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Validation(e) => e.reason(),
            ServerError::Speech(e) => e.kind(),
            ServerError::AnalysisFailed(_) => "analysis_failed",
            ServerError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::SessionLimit => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Speech(SpeechError::InvalidCredential(_)) => StatusCode::UNAUTHORIZED,
            ServerError::Speech(SpeechError::InvalidInput(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Speech(SpeechError::SynthesisFailed(_)) => StatusCode::BAD_GATEWAY,
            ServerError::AnalysisFailed(_) => StatusCode::BAD_GATEWAY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status_code()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), error = %self, "Request failed");
        }

        (
            status,
            Json(serde_json::json!({
                "error": self.kind(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_chef_core::CredentialIssue;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StatusCode::from(ServerError::SessionNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(ValidationError::Empty).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServerError::from(SpeechError::InvalidCredential(CredentialIssue::Missing))
                .status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::from(SpeechError::SynthesisFailed("x".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            ServerError::from(ValidationError::TooShort { min: 3, actual: 1 }).kind(),
            "too_short"
        );
        assert_eq!(
            ServerError::from(SpeechError::InvalidInput("x".into())).kind(),
            "invalid_input"
        );
    }
}
