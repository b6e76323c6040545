//! LLM-powered code generation for the data analyst assistant
//!
//! This crate turns a natural-language research question into runnable
//! analysis code. It has no execution dependencies - running the code and
//! holding session state stays in the `data-analyst` crate.
//!
//! ## Architecture
//!
//! ```text
//! Query → classify → PromptBuilder → CodeGenerator → GeneratedCode
//!                         │                 │
//!                 ResourceResolver     LlmClient (Anthropic / Bedrock)
//! ```
//!
//! ## Backend Selection
//!
//! `AnalystConfig.model.backend` (or the `ANALYST_BACKEND` override):
//! - `anthropic` (default): Anthropic Messages API
//! - `bedrock`: AWS Bedrock runtime (bearer token auth)

// LLM client abstraction
pub mod anthropic_client;
pub mod backend;
pub mod bedrock_client;
pub mod client_factory;
pub mod llm_client;

// Routing and generation
pub mod generator;
pub mod intent;
pub mod prompt;
pub mod resources;

#[cfg(test)]
mod stub_server;

// Re-exports for convenience
pub use backend::AgentBackend;
pub use client_factory::{create_llm_client, ClientOptions};
pub use generator::{CodeGenerator, GeneratedCode, SamplingParams};
pub use intent::{classify, Intent};
pub use llm_client::{CompletionRequest, LlmClient};
pub use prompt::{InputKind, PromptArtifact, PromptBuilder, PromptTemplate};
pub use resources::{FileResourceStore, ResourceResolver, ResourceStore};
