//! Session Model
//!
//! One user's continuous interaction: an initial generation followed by
//! zero or more edit / re-run cycles over the same stored code.

use analyst_agentic::{GeneratedCode, Intent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::execution::ExecutionResult;

/// Where the session is in its cycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No code yet
    #[default]
    Idle,
    /// Classifying, building the prompt, waiting on the model
    Generating { started_at: DateTime<Utc> },
    /// Running code
    Executing { started_at: DateTime<Utc> },
    /// Code and its last result are available
    Ready,
    /// The user replaced the code; not yet re-run
    EditingReady,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Whether there is code that can be edited or re-run
    pub fn has_code(&self) -> bool {
        matches!(self, SessionState::Ready | SessionState::EditingReady)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Generating { .. } => "Generating",
            SessionState::Executing { .. } => "Executing",
            SessionState::Ready => "Ready",
            SessionState::EditingReady => "EditingReady",
        }
    }
}

/// How many times each pipeline stage ran in this session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounters {
    pub classifications: u32,
    pub prompt_builds: u32,
    pub generations: u32,
    pub executions: u32,
    pub edits: u32,
}

/// Session state threaded through every cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    state: SessionState,
    code: Option<String>,
    last_query: Option<String>,
    last_intent: Option<Intent>,
    last_generation: Option<GeneratedCode>,
    last_result: Option<ExecutionResult>,
    counters: StageCounters,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a new empty session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active_at: now,
            state: SessionState::Idle,
            code: None,
            last_query: None,
            last_intent: None,
            last_generation: None,
            last_result: None,
            counters: StageCounters::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The code currently stored (generated or edited)
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn last_intent(&self) -> Option<Intent> {
        self.last_intent
    }

    pub fn last_generation(&self) -> Option<&GeneratedCode> {
        self.last_generation.as_ref()
    }

    pub fn last_result(&self) -> Option<&ExecutionResult> {
        self.last_result.as_ref()
    }

    pub fn counters(&self) -> StageCounters {
        self.counters
    }

    /// Replace the stored code without regenerating
    ///
    /// Only valid once there is code to edit.
    pub fn edit(&mut self, code: impl Into<String>) -> Result<(), SessionError> {
        if !self.state.has_code() {
            return Err(SessionError::NothingToRun);
        }
        self.code = Some(code.into());
        self.counters.edits += 1;
        self.transition(SessionState::EditingReady);
        Ok(())
    }

    pub(crate) fn counters_mut(&mut self) -> &mut StageCounters {
        &mut self.counters
    }

    pub(crate) fn begin_generation(&mut self, query: &str) {
        self.last_query = Some(query.to_string());
        self.transition(SessionState::Generating {
            started_at: Utc::now(),
        });
    }

    /// Store generation output; the text is kept even when it is an error marker
    ///
    /// `intent` is `None` for raw submissions, which are not classified. The
    /// session stays `Generating` until it executes or is marked ready.
    pub(crate) fn store_generation(&mut self, intent: Option<Intent>, generated: GeneratedCode) {
        self.last_intent = intent;
        self.code = Some(generated.as_text().into_owned());
        self.last_generation = Some(generated);
        self.last_result = None;
    }

    /// Generated code is stored but not run
    pub(crate) fn mark_ready(&mut self) {
        self.transition(SessionState::Ready);
    }

    pub(crate) fn begin_execution(&mut self) {
        self.transition(SessionState::Executing {
            started_at: Utc::now(),
        });
    }

    pub(crate) fn finish(&mut self, result: ExecutionResult) {
        self.last_result = Some(result);
        self.transition(SessionState::Ready);
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(
            session = %self.id,
            from = self.state.name(),
            to = next.name(),
            "Session transition"
        );
        self.state = next;
        self.last_active_at = Utc::now();
    }
}
