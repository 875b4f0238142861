//! Data sources for questions, answers and server-side analytics.
//!
//! The transport is hidden behind [`SurveySource`]; the HTTP backend and
//! the offline sample data both implement it.

pub mod fallback;
pub mod http;

use crate::models::{ModuleAnalytics, RealtimeStats, ResponseSet, SurveyModule};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub use fallback::{question_bank, synthetic_response_set, OfflineSource};
pub use http::HttpSurveySource;

/// Errors from fetching survey data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Malformed payload: {0}")]
    Parse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Port for everything the engine reads from the survey backend.
#[async_trait]
pub trait SurveySource: Send + Sync {
    /// Questions and one user's answers for a module.
    async fn fetch_response_set(
        &self,
        module: SurveyModule,
        user_id: &str,
    ) -> Result<ResponseSet, SourceError>;

    /// Authoritative analytics for a module.
    async fn fetch_module_analytics(
        &self,
        module: SurveyModule,
    ) -> Result<ModuleAnalytics, SourceError>;

    /// Realtime counters, optionally for one survey.
    async fn fetch_realtime_stats(
        &self,
        survey_id: Option<&str>,
    ) -> Result<RealtimeStats, SourceError>;
}

/// Run a fetch with a deadline; expiry counts as a failure.
pub async fn with_timeout<T, F>(limit: Duration, fetch: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    tokio::time::timeout(limit, fetch)
        .await
        .map_err(|_| SourceError::Timeout(limit))?
}
