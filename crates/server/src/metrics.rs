//! Prometheus metrics
//!
//! - `data_chef_requests_total{endpoint, outcome}`
//! - `data_chef_analysis_latency_seconds`
//! - `data_chef_speech_latency_seconds`

use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;
use crate::ServerError;

const LATENCY_BUCKETS: [f64; 10] = [0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0];

/// Install the global Prometheus recorder
///
/// Must be called at most once per process.
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("latency_seconds".to_string()),
            &LATENCY_BUCKETS,
        )
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .install_recorder()
        .map_err(|e| ServerError::Internal(e.to_string()))
}

pub fn record_request(endpoint: &'static str, outcome: &'static str) {
    metrics::counter!("data_chef_requests_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
}

pub fn record_analysis_latency(elapsed: Duration) {
    metrics::histogram!("data_chef_analysis_latency_seconds").record(elapsed.as_secs_f64());
}

pub fn record_speech_latency(elapsed: Duration) {
    metrics::histogram!("data_chef_speech_latency_seconds").record(elapsed.as_secs_f64());
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled").into_response(),
    }
}
