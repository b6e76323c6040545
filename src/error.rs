//! Error handling for the analyst assistant
//!
//! Failures of the pipeline stages themselves (resource reads, model calls,
//! executed code) are values, not errors: they travel as
//! `PromptArtifact::ResourceError`, `GeneratedCode::ServiceError` and
//! `ExecutionResult::error`. The types here cover misuse and configuration;
//! model clients report through `anyhow` in `analyst-agentic`.

use std::path::PathBuf;

use thiserror::Error;

/// Session state machine misuse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("no code in this session yet - submit a query first")]
    NothingToRun,
}

/// Configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0}")]
    InvalidBackend(#[from] analyst_agentic::backend::ParseBackendError),

    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
