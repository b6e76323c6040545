//! Data Analyst Assistant
//!
//! Turns a natural-language research question into analysis code, runs it,
//! and lets the user edit and re-run the result within a session.
//!
//! ## Pipeline
//!
//! ```text
//! query → classify → PromptBuilder → CodeGenerator → PythonExecutor
//!            │              │               │               │
//!          Intent     PromptArtifact   GeneratedCode   ExecutionResult
//! ```
//!
//! Routing, prompts and model clients live in `analyst-agentic`; this crate
//! adds execution, configuration and the session state machine.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use data_analyst::{create_llm_client, ConfigLoader, Session, SessionLoop};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ConfigLoader::from_env().load()?;
//! let client = create_llm_client(&config.model.client_options())?;
//! let pipeline = SessionLoop::from_config(&config, client);
//!
//! let mut session = Session::new();
//! let outcome = pipeline.submit(&mut session, "Generate a multiplication table").await?;
//! println!("{}", outcome.code);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

pub mod config;
pub mod execution;
pub mod repl;
pub mod session;
pub mod telemetry;

pub use analyst_agentic::{
    classify, create_llm_client, AgentBackend, GeneratedCode, InputKind, Intent, LlmClient,
    PromptArtifact,
};
pub use config::{AnalystConfig, ConfigLoader};
pub use error::{ConfigError, SessionError};
pub use execution::{CodeExecutor, ExecutionResult, PythonExecutor};
pub use session::{CycleOutcome, Session, SessionLoop, SessionState};

/// Example questions offered to new users
pub const EXAMPLE_QUERIES: &[&str] = &[
    "What's the Sharpe ratio of HSI in 2024?",
    "Plot a chart of CPI of China and US",
    "Plot HSI daily chart of 2024",
    "Create a bar chart of random data",
    "Generate a multiplication table",
    "Calculate fibonacci sequence",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_queries_cover_every_route() {
        let intents: Vec<Intent> = EXAMPLE_QUERIES.iter().map(|q| classify(q)).collect();
        assert!(intents.contains(&Intent::StaticResource));
        assert!(intents.contains(&Intent::TemplatedGeneration));
        assert!(intents.contains(&Intent::FreeformGeneration));
    }
}
