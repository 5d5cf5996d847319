//! End-to-end orchestrator behavior with counting test doubles
//!
//! Covers analyze → history → speak against mock backends, and the remote
//! analysis backend against a local fake service.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use data_chef_agent::{ConversationOrchestrator, HttpAnalysisBackend, MockAnalysisBackend};
use data_chef_core::{
    AnalysisBackend, AnalysisStatus, Credential, CredentialIssue, HistoryOrder, SpeechError,
    ValidationError, VoiceConfig,
};
use data_chef_speech::{MockSpeechProvider, SpeechClient, FAKE_MP3};

const VALID_KEY: &str = "q7W2e9R4t1Y6u3I8o5P0a2S7";

struct Harness {
    orchestrator: ConversationOrchestrator,
    backend: Arc<MockAnalysisBackend>,
    speech: Arc<MockSpeechProvider>,
}

fn harness_with(speech: MockSpeechProvider) -> Harness {
    let backend = Arc::new(MockAnalysisBackend::instant());
    let speech = Arc::new(speech);
    let orchestrator =
        ConversationOrchestrator::new(backend.clone(), SpeechClient::new(speech.clone()));
    Harness {
        orchestrator,
        backend,
        speech,
    }
}

fn harness() -> Harness {
    harness_with(MockSpeechProvider::new())
}

fn valid_voice() -> VoiceConfig {
    VoiceConfig::new(Some(Credential::new(VALID_KEY)))
}

#[tokio::test]
async fn test_empty_input_never_reaches_backend() {
    let h = harness();

    for input in ["", " ", "ab"] {
        assert!(h.orchestrator.analyze(input).await.is_err());
    }
    assert_eq!(h.orchestrator.analyze("").await.unwrap_err(), ValidationError::Empty);

    assert_eq!(h.backend.call_count(), 0);
    assert_eq!(h.orchestrator.history_len(), 0);
}

#[tokio::test]
async fn test_oversized_input_rejected() {
    let h = harness();
    let long = "a".repeat(1001);

    let err = h.orchestrator.analyze(&long).await.unwrap_err();
    assert!(matches!(err, ValidationError::TooLong { max: 1000, actual: 1001 }));
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn test_april_query_appends_one_entry() {
    let h = harness();

    let result = h.orchestrator.analyze("Show me April metrics").await.unwrap();
    assert_ne!(result.status, AnalysisStatus::Error);
    assert_eq!(result.user_query, "Show me April metrics");

    let history = h.orchestrator.history_snapshot(None, HistoryOrder::OldestFirst);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user, "Show me April metrics");
    assert_eq!(history[0].assistant, result);
    assert_eq!(h.backend.call_count(), 1);
}

#[tokio::test]
async fn test_three_analyses_then_clear() {
    let h = harness();
    for q in ["first query", "second query", "third query"] {
        h.orchestrator.analyze(q).await.unwrap();
    }

    let oldest = h.orchestrator.history_snapshot(None, HistoryOrder::OldestFirst);
    let users: Vec<&str> = oldest.iter().map(|e| e.user.as_str()).collect();
    assert_eq!(users, ["first query", "second query", "third query"]);

    let newest = h.orchestrator.history_snapshot(Some(2), HistoryOrder::NewestFirst);
    let users: Vec<&str> = newest.iter().map(|e| e.user.as_str()).collect();
    assert_eq!(users, ["third query", "second query"]);

    assert_eq!(h.orchestrator.clear_history(), 3);
    assert!(h.orchestrator.history_snapshot(None, HistoryOrder::OldestFirst).is_empty());
    assert_eq!(h.orchestrator.clear_history(), 0);
}

#[tokio::test]
async fn test_speak_without_credential_makes_no_call() {
    let h = harness();

    let err = h
        .orchestrator
        .speak("hello", &VoiceConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err, SpeechError::InvalidCredential(CredentialIssue::Missing));
    assert_eq!(h.speech.call_count(), 0);
}

#[tokio::test]
async fn test_speak_success_leaves_history_alone() {
    let h = harness();
    h.orchestrator.analyze("Show me April metrics").await.unwrap();
    let before = h.orchestrator.history_snapshot(None, HistoryOrder::OldestFirst);

    let audio = h.orchestrator.speak("hello", &valid_voice()).await.unwrap();
    assert!(!audio.is_empty());
    assert_eq!(audio, FAKE_MP3);

    assert_eq!(h.orchestrator.history_snapshot(None, HistoryOrder::OldestFirst), before);
    assert_eq!(h.speech.call_count(), 1);
}

#[tokio::test]
async fn test_speak_failure_is_typed_and_leaves_history_alone() {
    let h = harness_with(MockSpeechProvider::failing("insufficient credits"));
    h.orchestrator.analyze("Show me April metrics").await.unwrap();

    let err = h.orchestrator.speak("hello", &valid_voice()).await.unwrap_err();
    assert!(matches!(err, SpeechError::SynthesisFailed(_)));
    assert_eq!(h.orchestrator.history_len(), 1);
}

#[tokio::test]
async fn test_speak_latest_uses_last_response() {
    let h = harness();

    h.orchestrator.speak_latest(&valid_voice()).await.unwrap();
    assert!(h.speech.last_text().unwrap().contains("Data Chef Response"));

    let result = h.orchestrator.analyze("Show me April metrics").await.unwrap();
    h.orchestrator.speak_latest(&valid_voice()).await.unwrap();
    assert_eq!(h.speech.last_text().unwrap(), result.message);
    assert_eq!(h.speech.call_count(), 2);
}

async fn fake_analytics(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let query = body["query"].as_str().unwrap_or_default();
    match query {
        "server down please" => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
        "garbled reply" => (StatusCode::OK, "not json").into_response(),
        _ => {
            let authed = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer md_token_123");
            Json(json!({
                "status": "ok",
                "message": format!("Rows for '{}' (authed: {})", query, authed),
                "analysis": {
                    "summary": "Revenue by month",
                    "data_source": "Mother Duck",
                    "query_type": "Data Analysis",
                    "recommendations": ["Track churn weekly"]
                }
            }))
            .into_response()
        }
    }
}

async fn spawn_analytics() -> String {
    let app = Router::new().route("/analyze", post(fake_analytics));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/analyze", addr)
}

#[tokio::test]
async fn test_http_backend_success() {
    let url = spawn_analytics().await;
    let backend = HttpAnalysisBackend::new(
        url,
        Some(Credential::new("md_token_123")),
        Duration::from_secs(5),
    )
    .unwrap();

    let result = backend.analyze("monthly revenue").await;
    assert_eq!(result.status, AnalysisStatus::Ok);
    assert_eq!(result.message, "Rows for 'monthly revenue' (authed: true)");
    assert_eq!(result.user_query, "monthly revenue");
    assert_eq!(result.analysis.recommendations, vec!["Track churn weekly"]);
}

#[tokio::test]
async fn test_http_backend_failures_become_error_status() {
    let url = spawn_analytics().await;
    let backend = HttpAnalysisBackend::new(url, None, Duration::from_secs(5)).unwrap();

    let result = backend.analyze("server down please").await;
    assert_eq!(result.status, AnalysisStatus::Error);
    assert!(result.message.contains("503"));

    let result = backend.analyze("garbled reply").await;
    assert_eq!(result.status, AnalysisStatus::Error);
    assert!(!result.message.is_empty());
}

#[tokio::test]
async fn test_error_result_not_recorded() {
    let url = spawn_analytics().await;
    let backend = Arc::new(HttpAnalysisBackend::new(url, None, Duration::from_secs(5)).unwrap());
    let orchestrator = ConversationOrchestrator::new(
        backend,
        SpeechClient::new(Arc::new(MockSpeechProvider::new())),
    );

    let result = orchestrator.analyze("server down please").await.unwrap();
    assert!(result.is_error());
    assert_eq!(orchestrator.history_len(), 0);

    orchestrator.analyze("monthly revenue").await.unwrap();
    assert_eq!(orchestrator.history_len(), 1);
}
