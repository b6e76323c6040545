//! Session Loop
//!
//! Drives one request/response cycle (classify → build → generate →
//! execute) and the edit / re-run cycles that follow it. All state lives in
//! the `Session` passed in; the loop itself holds only the pipeline stages.

use std::sync::Arc;
use std::time::Duration;

use analyst_agentic::{
    classify, CodeGenerator, GeneratedCode, InputKind, Intent, LlmClient, PromptArtifact,
    PromptBuilder,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::state::Session;
use crate::config::AnalystConfig;
use crate::error::SessionError;
use crate::execution::{CodeExecutor, ExecutionResult, PythonExecutor};

/// What one cycle produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleOutcome {
    /// `None` for re-runs, which skip classification
    pub intent: Option<Intent>,
    /// The code that was (or would have been) executed
    pub code: String,
    /// Whether the code came from a fresh generation
    pub generated: bool,
    pub result: ExecutionResult,
}

/// Classification, prompt and generation for a query, without execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preparation {
    pub intent: Intent,
    pub artifact: PromptArtifact,
    pub generated: GeneratedCode,
}

/// Orchestrates the pipeline over a session
pub struct SessionLoop {
    builder: PromptBuilder,
    generator: CodeGenerator,
    executor: Arc<dyn CodeExecutor>,
    model_id: String,
    max_tokens: u32,
}

impl SessionLoop {
    pub fn new(
        builder: PromptBuilder,
        generator: CodeGenerator,
        executor: Arc<dyn CodeExecutor>,
        model_id: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            builder,
            generator,
            executor,
            model_id: model_id.into(),
            max_tokens,
        }
    }

    /// Wire the pipeline from configuration around an existing client
    pub fn from_config(config: &AnalystConfig, client: Arc<dyn LlmClient>) -> Self {
        let builder = config.prompt_builder();
        let generator = CodeGenerator::with_client(client).with_sampling(config.model.sampling());
        let executor = Arc::new(PythonExecutor::from_config(&config.executor));

        Self::new(
            builder,
            generator,
            executor,
            config.model.model_id(),
            config.model.max_tokens,
        )
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn executor(&self) -> &Arc<dyn CodeExecutor> {
        &self.executor
    }

    /// Classify, build and generate; stores the result in the session
    ///
    /// Leaves the session `Ready` with the generated text as its code, so a
    /// caller can follow up with `rerun` to execute it.
    pub async fn prepare(
        &self,
        session: &mut Session,
        query: &str,
    ) -> Result<Preparation, SessionError> {
        let preparation = self.generate_for(session, query).await?;
        session.mark_ready();
        Ok(preparation)
    }

    /// Classify, build and generate, leaving the session `Generating`
    async fn generate_for(
        &self,
        session: &mut Session,
        query: &str,
    ) -> Result<Preparation, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        session.begin_generation(query);

        let intent = classify(query);
        session.counters_mut().classifications += 1;
        info!(session = %session.id, %intent, "Classified query");

        let artifact = self.builder.build(intent, query).await;
        session.counters_mut().prompt_builds += 1;

        let generated = self
            .generator
            .generate(&artifact, &self.model_id, self.max_tokens)
            .await;
        session.counters_mut().generations += 1;

        session.store_generation(Some(intent), generated.clone());

        Ok(Preparation {
            intent,
            artifact,
            generated,
        })
    }

    /// Full cycle: generate, then execute
    ///
    /// A generation failure skips execution; the failure text is stored as
    /// the session's code and reported as the execution error.
    pub async fn submit(
        &self,
        session: &mut Session,
        query: &str,
    ) -> Result<CycleOutcome, SessionError> {
        let preparation = self.generate_for(session, query).await?;
        let result = self.execute_generated(session, &preparation.generated).await;

        Ok(CycleOutcome {
            intent: Some(preparation.intent),
            code: preparation.generated.into_text(),
            generated: true,
            result,
        })
    }

    /// Full cycle for untagged input such as a loaded file
    ///
    /// Classification and prompt building are skipped. `kind` says whether
    /// the text is code to run as-is or an instruction for the model; a
    /// rendered resource error stays an error either way.
    pub async fn submit_raw(
        &self,
        session: &mut Session,
        kind: InputKind,
        raw: &str,
    ) -> Result<CycleOutcome, SessionError> {
        if raw.trim().is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        let artifact = PromptArtifact::from_raw(raw, kind);
        info!(
            session = %session.id,
            ?kind,
            passthrough = artifact.is_passthrough(),
            "Submitting raw input"
        );

        session.begin_generation(raw);
        let generated = self
            .generator
            .generate(&artifact, &self.model_id, self.max_tokens)
            .await;
        session.counters_mut().generations += 1;
        session.store_generation(None, generated.clone());

        let result = self.execute_generated(session, &generated).await;
        Ok(CycleOutcome {
            intent: None,
            code: generated.into_text(),
            generated: true,
            result,
        })
    }

    /// Replace the stored code; no regeneration
    pub fn edit(&self, session: &mut Session, code: impl Into<String>) -> Result<(), SessionError> {
        session.edit(code)
    }

    /// Execute the stored code again, bypassing classification and generation
    pub async fn rerun(&self, session: &mut Session) -> Result<CycleOutcome, SessionError> {
        if !session.state().has_code() {
            return Err(SessionError::NothingToRun);
        }
        let code = session
            .code()
            .map(str::to_string)
            .ok_or(SessionError::NothingToRun)?;

        let result = self.execute(session, &code).await;
        Ok(CycleOutcome {
            intent: None,
            code,
            generated: false,
            result,
        })
    }

    /// Execute generated code, or record the generation failure as the result
    async fn execute_generated(
        &self,
        session: &mut Session,
        generated: &GeneratedCode,
    ) -> ExecutionResult {
        match generated.code() {
            Some(code) => self.execute(session, code).await,
            None => {
                info!(session = %session.id, "Generation failed, skipping execution");
                let result = ExecutionResult::failure(generated.as_text(), None, Duration::ZERO);
                session.finish(result.clone());
                result
            }
        }
    }

    async fn execute(&self, session: &mut Session, code: &str) -> ExecutionResult {
        session.begin_execution();
        let result = self.executor.run(code).await;
        session.counters_mut().executions += 1;

        match &result.error {
            None => info!(
                session = %session.id,
                duration_ms = result.duration.as_millis() as u64,
                "Code executed successfully"
            ),
            Some(error) => info!(session = %session.id, %error, "Error during execution"),
        }

        session.finish(result.clone());
        result
    }
}
