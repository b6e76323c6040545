//! Configuration types
//!
//! One YAML document with a section per pipeline stage. Every field has a
//! default, so an empty file (or no file) is a valid configuration.

pub mod loader;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use analyst_agentic::generator::DEFAULT_MAX_TOKENS;
use analyst_agentic::{
    AgentBackend, ClientOptions, FileResourceStore, PromptBuilder, PromptTemplate, ResourceResolver,
    SamplingParams,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use loader::ConfigLoader;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalystConfig {
    pub model: ModelConfig,
    pub resources: ResourceConfig,
    pub prompt: PromptTemplate,
    pub executor: ExecutorConfig,
}

/// Generative model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub backend: AgentBackend,
    /// Falls back to the backend's default model
    pub model_id: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
    pub base_url: Option<String>,
    pub region: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let sampling = SamplingParams::default();
        Self {
            backend: AgentBackend::default(),
            model_id: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            timeout_secs: 60,
            base_url: None,
            region: None,
        }
    }
}

impl ModelConfig {
    pub fn model_id(&self) -> &str {
        self.model_id
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            backend: self.backend,
            timeout: Duration::from_secs(self.timeout_secs),
            base_url: self.base_url.clone(),
            region: self.region.clone(),
        }
    }
}

/// Static resource settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub dir: PathBuf,
    pub static_delay_ms: u64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("resources"),
            static_delay_ms: 2000,
        }
    }
}

impl ResourceConfig {
    pub fn static_delay(&self) -> Duration {
        Duration::from_millis(self.static_delay_ms)
    }
}

/// Code executor limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub interpreter: String,
    /// Extra interpreter arguments placed before the script path
    pub args: Vec<String>,
    pub timeout_secs: u64,
    pub max_output_bytes: usize,
    /// Working directory for executed code; local data files live here
    pub work_dir: Option<PathBuf>,
    /// Variables passed through from the parent environment
    pub env_allowlist: Vec<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            args: Vec::new(),
            timeout_secs: 120,
            max_output_bytes: 256 * 1024,
            work_dir: None,
            env_allowlist: [
                "PATH",
                "HOME",
                "LANG",
                "LC_ALL",
                "TMPDIR",
                "PYTHONPATH",
                "VIRTUAL_ENV",
                "AWS_REGION",
                "AWS_PROFILE",
            ]
            .iter()
            .map(|v| v.to_string())
            .collect(),
        }
    }
}

impl AnalystConfig {
    /// Prompt builder reading static resources from `resources.dir`
    pub fn prompt_builder(&self) -> PromptBuilder {
        let store = Arc::new(FileResourceStore::new(&self.resources.dir));
        let resolver = ResourceResolver::new(store).with_delay(self.resources.static_delay());
        PromptBuilder::new(resolver, self.prompt.clone())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.max_tokens == 0 {
            return Err(invalid("model.max_tokens", "must be greater than zero"));
        }
        if self.model.timeout_secs == 0 {
            return Err(invalid("model.timeout_secs", "must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(invalid("model.temperature", "must be between 0.0 and 1.0"));
        }
        if !(0.0..=1.0).contains(&self.model.top_p) || self.model.top_p == 0.0 {
            return Err(invalid("model.top_p", "must be in (0.0, 1.0]"));
        }
        if self.executor.interpreter.trim().is_empty() {
            return Err(invalid("executor.interpreter", "must not be empty"));
        }
        if self.executor.timeout_secs == 0 {
            return Err(invalid("executor.timeout_secs", "must be greater than zero"));
        }
        if self.executor.max_output_bytes == 0 {
            return Err(invalid("executor.max_output_bytes", "must be greater than zero"));
        }
        if self.prompt.data_file.trim().is_empty() {
            return Err(invalid("prompt.data_file", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.to_string(),
    }
}
