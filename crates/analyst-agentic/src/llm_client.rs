//! LLM Client Trait
//!
//! Unified interface for the text-generation providers (Anthropic, Bedrock).

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single-turn completion request
///
/// The prompt is sent as the only user message. Providers map the remaining
/// fields onto their own request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// User-turn content
    pub prompt: String,
    /// Provider model identifier
    pub model_id: String,
    /// Token budget for the response
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Unified LLM client interface
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single-turn request, return the first text block of the response
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Get the provider name for logging and error messages
    fn provider_name(&self) -> &str;
}

/// The `messages` array shared by both providers
pub(crate) fn user_messages(prompt: &str) -> serde_json::Value {
    serde_json::json!([{ "role": "user", "content": prompt }])
}

/// Extract the first text content block from a Messages-style response body
///
/// Both the Anthropic API and Bedrock's Anthropic models answer with
/// `{"content": [{"type": "text", "text": "..."}, ...]}`.
pub fn first_text_block(body: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct ContentBlock {
        text: Option<String>,
    }
    #[derive(Deserialize)]
    struct ApiResponse {
        content: Vec<ContentBlock>,
    }

    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("Failed to parse model response: {}", e))?;

    response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| anyhow!("Model response contained no text content"))
}

/// Leading slice of a response body for debug logs, cut on a char boundary
pub(crate) fn log_preview(body: &str) -> &str {
    const LIMIT: usize = 1000;
    match body.char_indices().nth(LIMIT) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Turn a reqwest transport error into a short message
pub(crate) fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out waiting for the model service".to_string()
    } else if e.is_connect() {
        format!("unable to reach the model service: {}", e)
    } else {
        format!("network error: {}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_block() {
        let body = r#"{"id":"msg_1","content":[{"type":"text","text":"print(1)"}],"stop_reason":"end_turn"}"#;
        assert_eq!(first_text_block(body).unwrap(), "print(1)");
    }

    #[test]
    fn test_first_text_block_skips_non_text() {
        let body = r#"{"content":[{"type":"tool_use","id":"t1"},{"type":"text","text":"x = 2"}]}"#;
        assert_eq!(first_text_block(body).unwrap(), "x = 2");
    }

    #[test]
    fn test_first_text_block_empty_content() {
        let err = first_text_block(r#"{"content":[]}"#).unwrap_err();
        assert!(err.to_string().contains("no text content"));
    }

    #[test]
    fn test_first_text_block_malformed() {
        assert!(first_text_block("not json").is_err());
        assert!(first_text_block(r#"{"message":"throttled"}"#).is_err());
    }

    #[test]
    fn test_log_preview_respects_char_boundaries() {
        let body = "é".repeat(1500);
        assert_eq!(log_preview(&body).chars().count(), 1000);
        assert_eq!(log_preview("short"), "short");
    }

    #[test]
    fn test_user_messages_shape() {
        let messages = user_messages("hello");
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "hello");
        assert_eq!(messages.as_array().unwrap().len(), 1);
    }
}
