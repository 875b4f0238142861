//! HTTP client for the survey backend.

use crate::models::{ModuleAnalytics, RealtimeStats, ResponseSet, SurveyModule};
use crate::source::{SourceError, SurveySource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// [`SurveySource`] backed by the dashboard REST API.
pub struct HttpSurveySource {
    base_url: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl HttpSurveySource {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn responses_url(&self, module: SurveyModule, user_id: &str) -> String {
        format!("{}/api/surveys/responses/{}/{}", self.base_url, module.slug(), user_id)
    }

    fn analytics_url(&self, module: SurveyModule) -> String {
        format!("{}/api/analytics/{}", self.base_url, module.slug())
    }

    fn realtime_url(&self) -> String {
        format!("{}/api/realtime/stats", self.base_url)
    }

    /// GET a URL and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(self.timeout)
                } else if e.is_connect() {
                    SourceError::Fetch(format!("Cannot connect to survey API at {}", self.base_url))
                } else {
                    SourceError::Fetch(format!("Failed to send request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Fetch(format!("Survey API error {}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Fetch(format!("Failed to read response body: {}", e)))?;

        decode(&body)
    }
}

/// Decode a JSON payload, mapping failures to [`SourceError::Parse`].
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))
}

#[async_trait]
impl SurveySource for HttpSurveySource {
    async fn fetch_response_set(
        &self,
        module: SurveyModule,
        user_id: &str,
    ) -> Result<ResponseSet, SourceError> {
        self.get_json(&self.responses_url(module, user_id), &[]).await
    }

    async fn fetch_module_analytics(
        &self,
        module: SurveyModule,
    ) -> Result<ModuleAnalytics, SourceError> {
        self.get_json(&self.analytics_url(module), &[]).await
    }

    async fn fetch_realtime_stats(
        &self,
        survey_id: Option<&str>,
    ) -> Result<RealtimeStats, SourceError> {
        match survey_id {
            Some(id) => self.get_json(&self.realtime_url(), &[("surveyId", id)]).await,
            None => self.get_json(&self.realtime_url(), &[]).await,
        }
    }
}
