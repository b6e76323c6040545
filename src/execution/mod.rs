//! Code execution
//!
//! Generated or edited code runs in a fresh interpreter subprocess. The
//! executor never fails past its own boundary: every outcome, including a
//! spawn failure or a timeout, is an `ExecutionResult`.

pub mod executor;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use executor::{ExecutorLimits, PythonExecutor};

/// Outcome of one run
///
/// When `error` is set, `output` is `None`. Both are `None` when the
/// program succeeded without printing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub output: Option<String>,
    pub error: Option<String>,
    /// Process exit code, `None` if killed, timed out, or never started
    pub exit_code: Option<i32>,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn success(output: String, exit_code: Option<i32>, duration: Duration) -> Self {
        Self {
            output: (!output.is_empty()).then_some(output),
            error: None,
            exit_code,
            duration,
        }
    }

    pub fn failure(error: impl Into<String>, exit_code: Option<i32>, duration: Duration) -> Self {
        Self {
            output: None,
            error: Some(error.into()),
            exit_code,
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs a code string
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn run(&self, code: &str) -> ExecutionResult;
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_empty_output() {
        let result = ExecutionResult::success(String::new(), Some(0), Duration::ZERO);
        assert!(result.is_success());
        assert_eq!(result.output, None);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_failure_discards_output() {
        let result = ExecutionResult::failure("boom", Some(1), Duration::from_millis(5));
        assert!(!result.is_success());
        assert_eq!(result.output, None);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_serializes_duration_as_millis() {
        let result = ExecutionResult::success("hi\n".to_string(), Some(0), Duration::from_millis(42));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["duration"], 42);
        assert_eq!(json["output"], "hi\n");
        let back: ExecutionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
