//! Interactive sessions
//!
//! `Session` holds the state of one user's interaction; `SessionLoop` runs
//! the pipeline over it.
//!
//! ```text
//! Idle ──submit──▶ Generating ──▶ Executing ──▶ Ready
//!                                    ▲            │ edit
//!                                    └──rerun── EditingReady
//! ```

pub mod orchestrator;
pub mod state;

pub use orchestrator::{CycleOutcome, Preparation, SessionLoop};
pub use state::{Session, SessionState, StageCounters};
