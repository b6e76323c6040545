//! Backend Selection
//!
//! Enum for selecting between LLM providers (Anthropic, Bedrock).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LLM backend provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentBackend {
    /// Anthropic Messages API (default)
    #[default]
    Anthropic,
    /// AWS Bedrock runtime
    Bedrock,
}

impl AgentBackend {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            AgentBackend::Anthropic => "Anthropic",
            AgentBackend::Bedrock => "Bedrock",
        }
    }

    /// Environment variable holding the API key / bearer token
    pub fn credential_var(&self) -> &'static str {
        match self {
            AgentBackend::Anthropic => "ANTHROPIC_API_KEY",
            AgentBackend::Bedrock => "AWS_BEARER_TOKEN_BEDROCK",
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            AgentBackend::Anthropic => crate::anthropic_client::DEFAULT_MODEL,
            AgentBackend::Bedrock => crate::bedrock_client::DEFAULT_MODEL,
        }
    }
}

/// Error type for parsing AgentBackend
#[derive(Debug, Error)]
#[error("Unknown backend '{0}'. Valid values: anthropic, claude, bedrock, aws")]
pub struct ParseBackendError(String);

impl FromStr for AgentBackend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(AgentBackend::Anthropic),
            "bedrock" | "aws" => Ok(AgentBackend::Bedrock),
            other => Err(ParseBackendError(other.to_string())),
        }
    }
}

impl std::fmt::Display for AgentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "anthropic".parse::<AgentBackend>().unwrap(),
            AgentBackend::Anthropic
        );
        assert_eq!(
            "claude".parse::<AgentBackend>().unwrap(),
            AgentBackend::Anthropic
        );
        assert_eq!(
            "BEDROCK".parse::<AgentBackend>().unwrap(),
            AgentBackend::Bedrock
        );
        assert_eq!("aws".parse::<AgentBackend>().unwrap(), AgentBackend::Bedrock);
        let err = "openai".parse::<AgentBackend>().unwrap_err();
        assert!(err.to_string().contains("openai"));
    }

    #[test]
    fn test_default() {
        assert_eq!(AgentBackend::default(), AgentBackend::Anthropic);
    }

    #[test]
    fn test_credential_vars() {
        assert_eq!(AgentBackend::Anthropic.credential_var(), "ANTHROPIC_API_KEY");
        assert_eq!(AgentBackend::Bedrock.credential_var(), "AWS_BEARER_TOKEN_BEDROCK");
    }

    #[test]
    fn test_default_models() {
        assert!(AgentBackend::Bedrock.default_model().starts_with("anthropic.claude"));
        assert!(AgentBackend::Anthropic.default_model().starts_with("claude"));
    }

    #[test]
    fn test_serde_lowercase() {
        let backend: AgentBackend = serde_json::from_str("\"bedrock\"").unwrap();
        assert_eq!(backend, AgentBackend::Bedrock);
        assert_eq!(
            serde_json::to_string(&AgentBackend::Anthropic).unwrap(),
            "\"anthropic\""
        );
    }
}
