//! Analysis backends
//!
//! - [`MockAnalysisBackend`] serves the canned chef-themed analysis
//! - [`HttpAnalysisBackend`] forwards queries to an external analytics service
//!
//! [`build_backend`] picks one from [`AnalysisConfig`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use data_chef_config::constants::{messages, mock_analysis};
use data_chef_config::AnalysisConfig;
use data_chef_core::{
    AnalysisBackend, AnalysisDetails, AnalysisError, AnalysisResult, AnalysisStatus, Credential,
};

/// Backend returning the canned analysis after a simulated delay
pub struct MockAnalysisBackend {
    latency: Duration,
    call_count: AtomicUsize,
}

impl MockAnalysisBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            call_count: AtomicUsize::new(0),
        }
    }

    /// No simulated delay
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Number of times `analyze` was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for MockAnalysisBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            data_chef_config::constants::timeouts::MOCK_LATENCY_MS,
        ))
    }
}

#[async_trait]
impl AnalysisBackend for MockAnalysisBackend {
    async fn analyze(&self, query: &str) -> AnalysisResult {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        AnalysisResult {
            status: AnalysisStatus::Mock,
            message: mock_analysis::MESSAGE.to_string(),
            timestamp: Utc::now(),
            user_query: query.to_string(),
            analysis: AnalysisDetails {
                summary: mock_analysis::SUMMARY.to_string(),
                data_source: mock_analysis::DATA_SOURCE.to_string(),
                query_type: mock_analysis::QUERY_TYPE.to_string(),
                recommendations: mock_analysis::RECOMMENDATIONS
                    .iter()
                    .map(|r| r.to_string())
                    .collect(),
            },
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn is_mock(&self) -> bool {
        true
    }
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    query: &'a str,
}

/// Body accepted from the analytics service
///
/// Only `message` is required; everything else is filled in locally.
#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    status: Option<AnalysisStatus>,
    message: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    analysis: Option<AnalysisDetails>,
}

const REMOTE_DATA_SOURCE: &str = "Mother Duck";

/// Backend calling a remote analytics endpoint with `POST {"query": ...}`
pub struct HttpAnalysisBackend {
    endpoint: String,
    api_key: Option<Credential>,
    client: Client,
}

impl HttpAnalysisBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<Credential>,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, query: &str) -> Result<AnalysisResult, AnalysisError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&AnalysisRequest { query });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        into_result(query, parsed)
    }
}

fn into_result(query: &str, parsed: AnalysisResponse) -> Result<AnalysisResult, AnalysisError> {
    let status = parsed.status.unwrap_or(AnalysisStatus::Ok);

    if !status.is_error() && parsed.message.trim().is_empty() {
        return Err(AnalysisError::Decode("response message is empty".to_string()));
    }

    let analysis = match parsed.analysis {
        Some(details) if !details.summary.trim().is_empty() => details,
        Some(details) => AnalysisDetails {
            summary: parsed.message.clone(),
            ..details
        },
        None => AnalysisDetails {
            summary: parsed.message.clone(),
            data_source: REMOTE_DATA_SOURCE.to_string(),
            query_type: mock_analysis::QUERY_TYPE.to_string(),
            recommendations: Vec::new(),
        },
    };

    Ok(AnalysisResult {
        status,
        message: parsed.message,
        timestamp: parsed.timestamp.unwrap_or_else(Utc::now),
        user_query: query.to_string(),
        analysis,
    })
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn analyze(&self, query: &str) -> AnalysisResult {
        match self.request(query).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Analysis request failed");
                AnalysisResult::error(query, format!("{} {}", messages::DATA_ANALYSIS_FAILED, e))
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Select the analysis backend for `config`
///
/// The remote backend is used only when mock mode is off and a backend URL
/// is set; every other combination falls back to the mock.
pub fn build_backend(config: &AnalysisConfig) -> Result<Arc<dyn AnalysisBackend>, AnalysisError> {
    match (&config.backend_url, config.mock_mode) {
        (Some(url), false) => {
            let api_key = Credential::from_optional(config.backend_api_key.as_deref());
            let backend = HttpAnalysisBackend::new(
                url.clone(),
                api_key,
                Duration::from_millis(config.timeout_ms),
            )?;
            tracing::info!(endpoint = %url, "Using remote analysis backend");
            Ok(Arc::new(backend))
        }
        (None, false) => {
            tracing::warn!("Mock mode disabled but no analysis backend URL configured; using mock");
            Ok(Arc::new(MockAnalysisBackend::new(Duration::from_millis(
                config.simulated_latency_ms,
            ))))
        }
        (_, true) => {
            tracing::info!(
                latency_ms = config.simulated_latency_ms,
                "Using mock analysis backend"
            );
            Ok(Arc::new(MockAnalysisBackend::new(Duration::from_millis(
                config.simulated_latency_ms,
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_canned_payload() {
        let backend = MockAnalysisBackend::instant();
        let result = backend.analyze("What about April?").await;

        assert_eq!(result.status, AnalysisStatus::Mock);
        assert_eq!(result.user_query, "What about April?");
        assert!(result.message.contains("April"));
        assert_eq!(result.analysis.recommendations.len(), 3);
        assert_eq!(backend.call_count(), 1);
        assert!(backend.is_mock());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_simulated_latency() {
        let backend = MockAnalysisBackend::new(Duration::from_millis(1000));
        let start = tokio::time::Instant::now();
        backend.analyze("revenue").await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[test]
    fn test_into_result_fills_missing_fields() {
        let parsed: AnalysisResponse =
            serde_json::from_str(r#"{"message": "Revenue grew 12%"}"#).unwrap();
        let result = into_result("growth?", parsed).unwrap();

        assert_eq!(result.status, AnalysisStatus::Ok);
        assert_eq!(result.analysis.summary, "Revenue grew 12%");
        assert_eq!(result.analysis.data_source, REMOTE_DATA_SOURCE);
        assert_eq!(result.user_query, "growth?");
    }

    #[test]
    fn test_into_result_rejects_empty_message() {
        let parsed: AnalysisResponse =
            serde_json::from_str(r#"{"status": "ok", "message": "  "}"#).unwrap();
        assert!(matches!(
            into_result("q", parsed),
            Err(AnalysisError::Decode(_))
        ));
    }

    #[test]
    fn test_build_backend_selection() {
        let mut config = AnalysisConfig {
            simulated_latency_ms: 0,
            ..AnalysisConfig::default()
        };
        assert!(build_backend(&config).unwrap().is_mock());

        config.mock_mode = false;
        assert!(build_backend(&config).unwrap().is_mock());

        config.backend_url = Some("http://127.0.0.1:9/analyze".to_string());
        let backend = build_backend(&config).unwrap();
        assert!(!backend.is_mock());
        assert_eq!(backend.name(), "http");

        config.mock_mode = true;
        assert!(build_backend(&config).unwrap().is_mock());
    }
}
