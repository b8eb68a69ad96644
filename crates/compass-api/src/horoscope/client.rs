use std::time::Duration;

use compass_db::models::{StudentProfile, TestResult};
use serde::Serialize;

use crate::error::ApiError;

/// Payload sent to the report generator
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub student: StudentProfile,
    pub latest_result: TestResult,
}

/// HTTP client for the external AI report service.
#[derive(Debug, Clone)]
pub struct HoroscopeClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HoroscopeClient {
    /// `timeout` bounds the whole request, including reading the body.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the request and return the JSON report.
    ///
    /// Transport errors, timeouts, non-2xx statuses and non-JSON bodies all
    /// become [`ApiError::Upstream`].
    pub async fn generate(&self, request: &GenerationRequest) -> Result<serde_json::Value, ApiError> {
        let mut builder = self.http.post(&self.endpoint).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Upstream("AI service timed out".to_string())
            } else {
                ApiError::Upstream(format!("AI service request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(format!(
                "AI service returned {}",
                status.as_u16()
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::Upstream(format!("AI service returned invalid JSON: {e}")))
    }
}
