//! Analysis backend trait

use async_trait::async_trait;

use crate::AnalysisResult;

/// Data analysis interface
///
/// Implementations:
/// - `MockAnalysisBackend` - canned chef-themed response after a simulated delay
/// - `HttpAnalysisBackend` - forwards the query to an external analytics service
///
/// Failures are reported in-band: an implementation returns a result with
/// `status = error` and a readable `message` instead of an `Err`, so callers
/// can always match on `status`.
#[async_trait]
pub trait AnalysisBackend: Send + Sync + 'static {
    /// Analyze a sanitized query
    async fn analyze(&self, query: &str) -> AnalysisResult;

    /// Backend name for logging
    fn name(&self) -> &str;

    /// Whether results are canned rather than computed
    fn is_mock(&self) -> bool {
        false
    }
}
