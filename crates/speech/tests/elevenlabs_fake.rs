//! ElevenLabs provider against a local fake of the REST API

use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use data_chef_core::{Credential, SpeechError, VoiceConfig};
use data_chef_speech::{ElevenLabsConfig, ElevenLabsProvider, SpeechClient};

const GOOD_KEY: &str = "sk_live_9b8c7d6e5f4a3b2c1d0e";
const AUDIO: &[u8] = b"ID3\x04fake-mp3-payload";

async fn tts(
    Path(voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let key = headers
        .get("xi-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if key != GOOD_KEY {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    if body["model_id"] != "eleven_monolingual_v1" || voice_id != "EXAVITQu4vr4xnSDxMaL" {
        return (StatusCode::BAD_REQUEST, "unexpected voice or model").into_response();
    }
    if body["text"] == "out of credits" {
        return (StatusCode::PAYMENT_REQUIRED, "quota_exceeded").into_response();
    }
    ([(header::CONTENT_TYPE, "audio/mpeg")], AUDIO.to_vec()).into_response()
}

async fn voices(headers: HeaderMap) -> impl IntoResponse {
    if headers.get("xi-api-key").is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "voices": [
            {"voice_id": "EXAVITQu4vr4xnSDxMaL", "name": "Bella", "category": "premade"},
            {"voice_id": "21m00Tcm4TlvDq8ikWAM", "name": "Rachel"}
        ]
    }))
    .into_response()
}

async fn spawn_fake() -> String {
    let app = Router::new()
        .route("/v1/text-to-speech/:voice_id", post(tts))
        .route("/v1/voices", get(voices));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v1", addr)
}

async fn client_for(base_url: String) -> SpeechClient {
    let config = ElevenLabsConfig::default()
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5));
    SpeechClient::new(Arc::new(ElevenLabsProvider::new(config).unwrap()))
}

#[tokio::test]
async fn test_synthesize_returns_body_bytes() {
    let client = client_for(spawn_fake().await).await;
    let voice = VoiceConfig::new(Some(Credential::new(GOOD_KEY)));

    let audio = client.synthesize("April revenue report", &voice).await.unwrap();
    assert_eq!(audio, AUDIO);
}

#[tokio::test]
async fn test_rejected_key_is_synthesis_failed() {
    let client = client_for(spawn_fake().await).await;
    let voice = VoiceConfig::new(Some(Credential::new("sk_live_0000000000000000000000")));

    let err = client.synthesize("April revenue report", &voice).await.unwrap_err();
    match err {
        SpeechError::SynthesisFailed(detail) => {
            assert!(detail.contains("401"));
            assert!(detail.contains("invalid api key"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_provider_error_body_is_reported() {
    let client = client_for(spawn_fake().await).await;
    let voice = VoiceConfig::new(Some(Credential::new(GOOD_KEY)));

    let err = client.synthesize("out of credits", &voice).await.unwrap_err();
    assert!(matches!(err, SpeechError::SynthesisFailed(d) if d.contains("quota_exceeded")));
}

#[tokio::test]
async fn test_voice_listing() {
    let client = client_for(spawn_fake().await).await;
    let voice = VoiceConfig::new(Some(Credential::new(GOOD_KEY)));

    let voices = client.voices(&voice).await.unwrap();
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].id, "EXAVITQu4vr4xnSDxMaL");
    assert_eq!(voices[0].name, "Bella");
}
