//! Anthropic Client
//!
//! LLM client implementation for the Anthropic Messages API.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::llm_client::{
    describe_transport_error, first_text_block, log_preview, user_messages, CompletionRequest,
    LlmClient,
};

/// Default Anthropic model
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new Anthropic client with the given API key and request timeout
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    /// Create against a non-default endpoint (proxies, gateways)
    pub fn with_base_url(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Request body for the Messages API
    pub fn request_body(request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": &request.model_id,
            "max_tokens": request.max_tokens,
            "messages": user_messages(&request.prompt),
            "temperature": request.temperature,
            "top_p": request.top_p,
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| anyhow!(describe_transport_error(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!(describe_transport_error(&e)))?;

        if !status.is_success() {
            return Err(anyhow!("Anthropic API error {}: {}", status, body));
        }

        tracing::debug!("Anthropic raw response: {}", log_preview(&body));
        first_text_block(&body)
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}
