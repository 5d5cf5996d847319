//! Analysis result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome tag of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// Produced by a real backend
    Ok,
    /// Canned response from the mock backend
    Mock,
    /// Backend or transport failure; `message` carries the reason
    Error,
}

impl AnalysisStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Mock => "mock",
            Self::Error => "error",
        }
    }
}

/// Structured part of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    pub summary: String,
    pub data_source: String,
    pub query_type: String,
    /// Ordered; the first entries are the most relevant
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Result returned by an `AnalysisBackend`
///
/// `message` and `analysis.summary` are non-empty unless `status` is `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub analysis: AnalysisDetails,
}

/// Recommendations included in `summary_line`
const SUMMARY_RECOMMENDATIONS: usize = 3;

impl AnalysisResult {
    /// Build an error-tagged result for `query`
    pub fn error(query: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: AnalysisStatus::Error,
            timestamp: Utc::now(),
            user_query: query.into(),
            analysis: AnalysisDetails {
                summary: message.clone(),
                data_source: "unavailable".to_string(),
                query_type: "Data Analysis".to_string(),
                recommendations: Vec::new(),
            },
            message,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }

    /// Text to hand to speech synthesis
    pub fn speech_text(&self) -> &str {
        if !self.message.trim().is_empty() {
            &self.message
        } else {
            &self.analysis.summary
        }
    }

    /// One-line digest: response, summary and the leading recommendations
    pub fn summary_line(&self) -> String {
        let mut parts = Vec::with_capacity(3);

        if !self.message.is_empty() {
            parts.push(format!("Response: {}", self.message));
        }
        if !self.analysis.summary.is_empty() {
            parts.push(format!("Summary: {}", self.analysis.summary));
        }
        if !self.analysis.recommendations.is_empty() {
            let recs: Vec<&str> = self
                .analysis
                .recommendations
                .iter()
                .take(SUMMARY_RECOMMENDATIONS)
                .map(String::as_str)
                .collect();
            parts.push(format!("Recommendations: {}", recs.join(", ")));
        }

        parts.join(" | ")
    }
}
