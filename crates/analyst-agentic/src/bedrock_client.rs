//! Bedrock Client
//!
//! LLM client for Anthropic models hosted on the AWS Bedrock runtime.
//! Authenticates with a Bedrock API key (`AWS_BEARER_TOKEN_BEDROCK`) sent
//! as a bearer token; there is no SigV4 request signing.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::llm_client::{
    describe_transport_error, first_text_block, log_preview, user_messages, CompletionRequest,
    LlmClient,
};

/// Default Bedrock model
pub const DEFAULT_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock runtime client
#[derive(Clone)]
pub struct BedrockClient {
    token: String,
    endpoint: String,
    client: reqwest::Client,
}

impl BedrockClient {
    /// Create a client for the regional runtime endpoint
    pub fn new(token: String, region: &str, timeout: Duration) -> Result<Self> {
        let endpoint = format!("https://bedrock-runtime.{}.amazonaws.com", region);
        Self::with_endpoint(token, &endpoint, timeout)
    }

    /// Create against an explicit endpoint (VPC endpoints, local stubs)
    pub fn with_endpoint(token: String, endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            token,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Invoke URL for a model; the `:` in versioned model ids is percent-encoded
    pub fn invoke_url(&self, model_id: &str) -> String {
        format!(
            "{}/model/{}/invoke",
            self.endpoint,
            model_id.replace(':', "%3A")
        )
    }

    /// Request body; Bedrock takes the model from the URL, not the body
    pub fn request_body(request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "max_tokens": request.max_tokens,
            "messages": user_messages(&request.prompt),
            "temperature": request.temperature,
            "top_p": request.top_p,
        })
    }
}

#[async_trait]
impl LlmClient for BedrockClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(self.invoke_url(&request.model_id))
            .bearer_auth(&self.token)
            .header("content-type", "application/json")
            .header("accept", "application/json")
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
            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Bedrock rejected the credentials ({}): {}", status, body),
                429 => anyhow!("Bedrock throttled the request: {}", body),
                _ => anyhow!("Bedrock API error {}: {}", status, body),
            });
        }

        tracing::debug!("Bedrock raw response: {}", log_preview(&body));
        first_text_block(&body)
    }

    fn provider_name(&self) -> &str {
        "Bedrock"
    }
}
