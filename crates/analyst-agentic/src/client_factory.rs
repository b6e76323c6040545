//! Client Factory
//!
//! Builds the configured `LlmClient` behind an `Arc<dyn LlmClient>`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::anthropic_client::AnthropicClient;
use crate::backend::AgentBackend;
use crate::bedrock_client::{BedrockClient, DEFAULT_REGION};
use crate::llm_client::LlmClient;

/// Connection options for building a client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub backend: AgentBackend,
    /// Whole-request timeout; expiry surfaces as a generation failure
    pub timeout: Duration,
    /// Endpoint override (Anthropic base URL or Bedrock runtime endpoint)
    pub base_url: Option<String>,
    /// AWS region (Bedrock only)
    pub region: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            backend: AgentBackend::default(),
            timeout: Duration::from_secs(60),
            base_url: None,
            region: None,
        }
    }
}

/// Create an LLM client, reading credentials from the environment
pub fn create_llm_client(options: &ClientOptions) -> Result<Arc<dyn LlmClient>> {
    tracing::info!(backend = %options.backend, "Creating LLM client");

    let var = options.backend.credential_var();
    let key = std::env::var(var).map_err(|_| anyhow!("{} environment variable not set", var))?;
    create_llm_client_with_key(options, key)
}

/// Create an LLM client with an explicit API key / bearer token
pub fn create_llm_client_with_key(
    options: &ClientOptions,
    key: String,
) -> Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match options.backend {
        AgentBackend::Anthropic => match &options.base_url {
            Some(url) => Arc::new(AnthropicClient::with_base_url(key, url, options.timeout)?),
            None => Arc::new(AnthropicClient::new(key, options.timeout)?),
        },
        AgentBackend::Bedrock => match &options.base_url {
            Some(url) => Arc::new(BedrockClient::with_endpoint(key, url, options.timeout)?),
            None => {
                let region = options
                    .region
                    .clone()
                    .or_else(|| std::env::var("AWS_REGION").ok())
                    .unwrap_or_else(|| DEFAULT_REGION.to_string());
                Arc::new(BedrockClient::new(key, &region, options.timeout)?)
            }
        },
    };
    Ok(client)
}
