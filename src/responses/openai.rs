//! OpenAI Responses API client
//!
//! Uses a long-lived reqwest::Client for connection pooling.
//! No request timeout is set here; the hosting layer bounds each call.

use super::{BackendError, ResponsesBackend, ResponsesRequest, ResponsesResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Reusable Responses API client (connection-pooled)
pub struct OpenAiResponsesClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiResponsesClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/responses", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ResponsesBackend for OpenAiResponsesClient {
    async fn create(
        &self,
        request: &ResponsesRequest,
    ) -> Result<ResponsesResponse, BackendError> {
        if self.api_key.is_empty() {
            return Err(BackendError::MissingApiKey);
        }

        info!(
            model = %request.model,
            tools = request.tools.len(),
            max_tool_calls = request.max_tool_calls,
            "Calling Responses API"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Responses API request failed: {}", e);
                BackendError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Responses API error response: {}", body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: ResponsesResponse = serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to parse Responses API body: {}", e);
            BackendError::Decode(e.to_string())
        })?;

        info!(
            response_id = parsed.id.as_deref().unwrap_or("-"),
            items = parsed.items().len(),
            "Responses API response received"
        );

        Ok(parsed)
    }
}
