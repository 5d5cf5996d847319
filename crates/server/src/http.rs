//! HTTP Endpoints
//!
//! REST API for Data Chef plus the single-page UI.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use data_chef_config::constants::{app, messages, speech};
use data_chef_core::{
    sanitize_filename, validate_file_extension, AnalysisResult, ConversationEntry,
    ConversationStats, Credential, HistoryOrder, VoiceInfo,
};
use data_chef_speech::SpeechClient;

use crate::metrics::{
    metrics_handler, record_analysis_latency, record_request, record_speech_latency,
};
use crate::session::Session;
use crate::state::AppState;
use crate::ServerError;

/// Upper bound for any single request, above the analysis and speech timeouts
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Success notice attached to generated audio
const NOTICE_HEADER: HeaderName = HeaderName::from_static("x-data-chef-notice");

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );

    Router::new()
        .route("/", get(index))
        // Session endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/analyze", post(analyze))
        .route("/api/sessions/:id/speak", post(speak))
        .route(
            "/api/sessions/:id/history",
            get(get_history).delete(clear_history),
        )
        .route("/api/sessions/:id/stats", get(get_stats))
        // Provider and app info
        .route("/api/voices", get(list_voices))
        .route("/api/status", get(app_status))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty or all invalid, allows localhost:8080 only
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:8080");
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static("http://localhost:8080"))
            .allow_methods(methods)
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods(methods)
        .allow_headers(Any)
}

fn session_or_404(state: &AppState, id: &str) -> Result<Arc<Session>, ServerError> {
    let session = state
        .sessions
        .get(id)
        .ok_or_else(|| ServerError::SessionNotFound(id.to_string()))?;
    session.touch();
    Ok(session)
}

/// Record a request outcome and pass the result through
fn tally<T>(endpoint: &'static str, result: Result<T, ServerError>) -> Result<T, ServerError> {
    match &result {
        Ok(_) => record_request(endpoint, "ok"),
        Err(e) => record_request(endpoint, e.kind()),
    }
    result
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    session_id: String,
    mock_mode: bool,
    welcome: &'static str,
}

/// Create a session
async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), ServerError> {
    let result = state
        .sessions
        .create(state.new_orchestrator())
        .map(|session| {
            (
                StatusCode::CREATED,
                Json(SessionCreated {
                    session_id: session.id.clone(),
                    mock_mode: session.orchestrator.is_mock(),
                    welcome: messages::WELCOME,
                }),
            )
        });
    tally("create_session", result)
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = session_or_404(&state, &id)?;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "active": session.is_active(),
        "history_length": session.orchestrator.history_len(),
        "mock_mode": session.orchestrator.is_mock(),
        "backend": session.orchestrator.backend_name(),
        "age_seconds": session.created_at.elapsed().as_secs(),
    })))
}

/// Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::SessionNotFound(id))
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    #[serde(flatten)]
    result: AnalysisResult,
    notice: &'static str,
}

/// Analyze a data question
async fn analyze(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let result = async {
        let session = session_or_404(&state, &id)?;

        let started = Instant::now();
        let result = session.orchestrator.analyze(&request.message).await?;
        record_analysis_latency(started.elapsed());

        if result.is_error() {
            return Err(ServerError::AnalysisFailed(result.message));
        }
        Ok::<_, ServerError>(Json(AnalyzeResponse {
            result,
            notice: messages::ANALYSIS_COMPLETED,
        }))
    }
    .await;

    tally("analyze", result)
}

#[derive(Debug, Default, Deserialize)]
struct SpeakRequest {
    /// Text to speak; the latest response when absent
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    voice_id: Option<String>,
    #[serde(default)]
    model_id: Option<String>,
    /// Overrides the configured credential for this call only
    #[serde(default)]
    api_key: Option<String>,
    /// Download name; must keep an audio extension after sanitizing
    #[serde(default)]
    filename: Option<String>,
}

impl SpeakRequest {
    /// Decode a speak body. An empty body asks for the latest response;
    /// anything else must be well-formed JSON.
    fn from_body(headers: &HeaderMap, body: &[u8]) -> Result<Self, ServerError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|mime| {
                let mime = mime.trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false);
        if !is_json {
            return Err(ServerError::InvalidRequest(
                "speak body must be sent as Content-Type: application/json".to_string(),
            ));
        }

        serde_json::from_slice(body)
            .map_err(|e| ServerError::InvalidRequest(format!("malformed speak body: {}", e)))
    }

    fn download_name(&self) -> Result<String, ServerError> {
        let name = sanitize_filename(self.filename.as_deref().unwrap_or(speech::AUDIO_FILENAME));
        if validate_file_extension(&name, &speech::AUDIO_EXTENSIONS) {
            Ok(name)
        } else {
            Err(ServerError::InvalidRequest(format!(
                "filename must end with one of {:?}, got '{}'",
                speech::AUDIO_EXTENSIONS,
                name
            )))
        }
    }
}

/// Synthesize speech and return MP3 bytes
async fn speak(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    let result = async {
        let session = session_or_404(&state, &id)?;
        let request = SpeakRequest::from_body(&headers, &body)?;
        let filename = request.download_name()?;

        let mut voice = state.default_voice();
        if let Some(voice_id) = request.voice_id.filter(|v| !v.trim().is_empty()) {
            voice.voice_id = voice_id;
        }
        if let Some(model_id) = request.model_id.filter(|m| !m.trim().is_empty()) {
            voice.model_id = model_id;
        }
        if let Some(key) = Credential::from_optional(request.api_key.as_deref()) {
            voice.api_key = Some(key);
        }

        let started = Instant::now();
        let audio = match request.text.as_deref() {
            Some(text) => session.orchestrator.speak(text, &voice).await?,
            None => session.orchestrator.speak_latest(&voice).await?,
        };
        record_speech_latency(started.elapsed());

        let content_type = session.orchestrator.speech().audio_format().to_string();
        let disposition = format!("attachment; filename=\"{}\"", filename);

        Ok::<_, ServerError>((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
                (NOTICE_HEADER, messages::VOICE_GENERATED.to_string()),
            ],
            audio,
        )
            .into_response())
    }
    .await;

    tally("speak", result)
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
    order: Option<String>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    session_id: String,
    count: usize,
    entries: Vec<ConversationEntry>,
}

/// History snapshot
async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let session = session_or_404(&state, &id)?;

    let order = match query.order.as_deref() {
        None => HistoryOrder::default(),
        Some(raw) => HistoryOrder::parse(raw).ok_or_else(|| {
            ServerError::InvalidRequest(format!(
                "order must be 'newest' or 'oldest', got '{}'",
                raw
            ))
        })?,
    };

    let entries = session.orchestrator.history_snapshot(query.limit, order);
    Ok(Json(HistoryResponse {
        session_id: session.id.clone(),
        count: entries.len(),
        entries,
    }))
}

/// Clear history
async fn clear_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = session_or_404(&state, &id)?;
    let cleared = session.orchestrator.clear_history();
    Ok(Json(serde_json::json!({ "cleared": cleared })))
}

/// Conversation statistics
async fn get_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationStats>, ServerError> {
    let session = session_or_404(&state, &id)?;
    Ok(Json(session.orchestrator.stats()))
}

#[derive(Debug, Serialize)]
struct VoicesResponse {
    voices: Vec<VoiceInfo>,
}

/// Voices available to the configured credential
async fn list_voices(State(state): State<AppState>) -> Result<Json<VoicesResponse>, ServerError> {
    let voices = state.speech.voices(&state.default_voice()).await?;
    Ok(Json(VoicesResponse { voices }))
}

/// Application and provider status
async fn app_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let credential = state.speech_credential();
    Json(serde_json::json!({
        "name": app::NAME,
        "description": app::DESCRIPTION,
        "version": env!("CARGO_PKG_VERSION"),
        "speech": SpeechClient::status_message(credential),
        "speech_configured": credential.is_some(),
        "speech_provider": state.speech.provider_name(),
        "mock_mode": state.backend.is_mock(),
        "analysis_backend": state.backend.name(),
        "sessions": state.sessions.count(),
    }))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready while there is room for new sessions
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let session_count = state.sessions.count();
    let ready = session_count < state.sessions.max_sessions();

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": {
                "sessions": {
                    "count": session_count,
                    "max": state.sessions.max_sessions(),
                },
                "analysis_backend": state.backend.name(),
                "speech_configured": state.speech_credential().is_some(),
            }
        })),
    )
}
