//! Code Generator
//!
//! Uses the LLM client to turn an instruction into runnable code. Literal
//! artifacts pass straight through; service failures are folded into
//! `GeneratedCode::ServiceError` so callers always get a value back.

use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::llm_client::{CompletionRequest, LlmClient};
use crate::prompt::PromptArtifact;
use crate::resources::RESOURCE_ERROR_MARKER;

/// Text prefix used when a generation failure is rendered
pub const SERVICE_ERROR_MARKER: &str = "Error getting response";

/// Default response token budget
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// Outcome of the generation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratedCode {
    /// Runnable code
    Code { source: String },
    /// Passed through from a failed static resource read
    ResourceError { detail: String },
    /// The model call failed
    ServiceError { provider: String, detail: String },
}

impl GeneratedCode {
    pub fn is_code(&self) -> bool {
        matches!(self, GeneratedCode::Code { .. })
    }

    /// The code, if generation succeeded
    pub fn code(&self) -> Option<&str> {
        match self {
            GeneratedCode::Code { source } => Some(source),
            _ => None,
        }
    }

    /// Text shown to the user and stored in the session
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            GeneratedCode::Code { source } => Cow::Borrowed(source),
            GeneratedCode::ResourceError { detail } => {
                Cow::Owned(format!("{} {}", RESOURCE_ERROR_MARKER, detail))
            }
            GeneratedCode::ServiceError { provider, detail } => Cow::Owned(format!(
                "{} from {}: {}",
                SERVICE_ERROR_MARKER, provider, detail
            )),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            GeneratedCode::Code { source } => source,
            other => other.as_text().into_owned(),
        }
    }
}

impl std::fmt::Display for GeneratedCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Code generator using LLM API
pub struct CodeGenerator {
    client: Arc<dyn LlmClient>,
    sampling: SamplingParams,
}

impl CodeGenerator {
    /// Create with a specific LLM client
    pub fn with_client(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            sampling: SamplingParams::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn client(&self) -> &Arc<dyn LlmClient> {
        &self.client
    }

    /// Produce code for an artifact
    ///
    /// Only `Instruction` artifacts reach the model.
    pub async fn generate(
        &self,
        artifact: &PromptArtifact,
        model_id: &str,
        max_tokens: u32,
    ) -> GeneratedCode {
        let prompt = match artifact {
            PromptArtifact::Code(code) => {
                tracing::debug!("Literal code artifact, skipping model call");
                return GeneratedCode::Code {
                    source: code.clone(),
                };
            }
            PromptArtifact::ResourceError(detail) => {
                return GeneratedCode::ResourceError {
                    detail: detail.clone(),
                };
            }
            PromptArtifact::Instruction(prompt) => prompt,
        };

        let request = CompletionRequest {
            prompt: prompt.clone(),
            model_id: model_id.to_string(),
            max_tokens,
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
        };

        tracing::info!(
            provider = self.client.provider_name(),
            model = model_id,
            max_tokens,
            "Requesting code generation"
        );

        let provider = self.client.provider_name().to_string();
        match self.client.complete(&request).await {
            Ok(text) => {
                let source = Self::strip_code_blocks(&text);
                if source.is_empty() {
                    tracing::warn!(provider = %provider, "Model returned empty code");
                    return GeneratedCode::ServiceError {
                        provider,
                        detail: "model returned an empty response".to_string(),
                    };
                }
                GeneratedCode::Code { source }
            }
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "Code generation failed");
                GeneratedCode::ServiceError {
                    provider,
                    detail: e.to_string(),
                }
            }
        }
    }

    /// Remove a surrounding Markdown fence the model added despite instructions
    pub fn strip_code_blocks(text: &str) -> String {
        let text = text.trim();
        if text.starts_with("```") {
            let lines: Vec<&str> = text.lines().collect();
            if lines.len() > 2 && lines[lines.len() - 1].trim() == "```" {
                // Skip first line (```python) and last line (```)
                return lines[1..lines.len() - 1].join("\n").trim().to_string();
            }
        }
        text.to_string()
    }
}
