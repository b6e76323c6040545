//! Subprocess executor for Python code
//!
//! Each run writes the code to a scoped temporary script, starts the
//! interpreter on it via `tokio::process::Command`, and captures stdout and
//! stderr into buffers. The script file is removed and the child killed on
//! every exit path (drop of the temp file, `kill_on_drop`).
//!
//! Limits injected per executor:
//! - wall-clock timeout
//! - captured output cap ([`ExecutorLimits::max_output_bytes`])
//! - environment reduced to an allowlist
//! - fixed working directory
//!
//! This is not a sandbox. Executed code can still read and write files and
//! open network connections with the user's privileges.

use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{CodeExecutor, ExecutionResult};
use crate::config::ExecutorConfig;

/// Variables always set for the child
///
/// `MPLBACKEND=Agg` keeps `plt.show()` from blocking on a display.
const FIXED_ENV: &[(&str, &str)] = &[
    ("PYTHONIOENCODING", "utf-8"),
    ("PYTHONUNBUFFERED", "1"),
    ("PYTHONDONTWRITEBYTECODE", "1"),
    ("MPLBACKEND", "Agg"),
];

/// Resource limits applied to every run
#[derive(Debug, Clone)]
pub struct ExecutorLimits {
    pub timeout: Duration,
    pub max_output_bytes: usize,
    pub work_dir: Option<PathBuf>,
    pub env_allowlist: Vec<String>,
}

impl Default for ExecutorLimits {
    fn default() -> Self {
        Self::from(&ExecutorConfig::default())
    }
}

impl From<&ExecutorConfig> for ExecutorLimits {
    fn from(config: &ExecutorConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_output_bytes: config.max_output_bytes,
            work_dir: config.work_dir.clone(),
            env_allowlist: config.env_allowlist.clone(),
        }
    }
}

/// Runs code with a Python interpreter
#[derive(Debug, Clone)]
pub struct PythonExecutor {
    interpreter: String,
    args: Vec<String>,
    limits: ExecutorLimits,
}

impl PythonExecutor {
    pub fn new(interpreter: impl Into<String>, limits: ExecutorLimits) -> Self {
        Self {
            interpreter: interpreter.into(),
            args: Vec::new(),
            limits,
        }
    }

    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            args: config.args.clone(),
            limits: ExecutorLimits::from(config),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn limits(&self) -> &ExecutorLimits {
        &self.limits
    }

    /// Whether the interpreter can be started at all
    pub async fn is_available(&self) -> bool {
        Command::new(&self.interpreter)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn stage_script(code: &str) -> std::io::Result<tempfile::NamedTempFile> {
        let mut script = tempfile::Builder::new()
            .prefix("analyst-")
            .suffix(".py")
            .tempfile()?;
        script.write_all(code.as_bytes())?;
        script.flush()?;
        Ok(script)
    }

    fn command(&self, script: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.args(&self.args)
            .arg(script)
            .env_clear()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for name in &self.limits.env_allowlist {
            if let Ok(value) = std::env::var(name) {
                cmd.env(name, value);
            }
        }
        cmd.envs(FIXED_ENV.iter().copied());

        if let Some(dir) = &self.limits.work_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl CodeExecutor for PythonExecutor {
    async fn run(&self, code: &str) -> ExecutionResult {
        let start = Instant::now();

        // Lives until the child has exited; dropping it deletes the file
        let script = match Self::stage_script(code) {
            Ok(script) => script,
            Err(e) => {
                warn!(error = %e, "Failed to stage script");
                return ExecutionResult::failure(
                    format!("failed to stage code for execution: {e}"),
                    None,
                    start.elapsed(),
                );
            }
        };

        info!(
            interpreter = %self.interpreter,
            bytes = code.len(),
            "Executing code"
        );

        let child = match self.command(script.path()).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(interpreter = %self.interpreter, error = %e, "Failed to start interpreter");
                return ExecutionResult::failure(
                    format!("failed to start interpreter '{}': {e}", self.interpreter),
                    None,
                    start.elapsed(),
                );
            }
        };

        let timeout = self.limits.timeout;
        let result = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let exit_code = output.status.code();
                let stdout = truncate_output(&output.stdout, self.limits.max_output_bytes);
                let stderr = truncate_output(&output.stderr, self.limits.max_output_bytes);
                let duration = start.elapsed();

                debug!(
                    exit_code = ?exit_code,
                    stdout_len = stdout.len(),
                    stderr_len = stderr.len(),
                    duration_ms = duration.as_millis() as u64,
                    "Execution completed",
                );

                if output.status.success() {
                    ExecutionResult::success(stdout, exit_code, duration)
                } else {
                    ExecutionResult::failure(error_summary(&stderr, exit_code), exit_code, duration)
                }
            }
            Ok(Err(e)) => ExecutionResult::failure(
                format!("failed to collect interpreter output: {e}"),
                None,
                start.elapsed(),
            ),
            Err(_elapsed) => {
                // The child was dropped with the future and is killed
                info!(timeout_ms = timeout.as_millis() as u64, "Execution timed out");
                ExecutionResult::failure(
                    format!("execution timed out after {:?}", timeout),
                    None,
                    start.elapsed(),
                )
            }
        };

        drop(script);
        result
    }
}

/// Converts raw bytes to a UTF-8 string, truncating at `max_bytes`
fn truncate_output(bytes: &[u8], max_bytes: usize) -> String {
    let limited = if bytes.len() > max_bytes {
        &bytes[..max_bytes]
    } else {
        bytes
    };
    let mut s = String::from_utf8_lossy(limited).into_owned();
    if bytes.len() > max_bytes {
        s.push_str("\n... [output truncated]");
    }
    s
}

/// The exception line of a traceback, or the exit status when stderr is empty
fn error_summary(stderr: &str, exit_code: Option<i32>) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match exit_code {
            Some(code) => format!("process exited with status {code}"),
            None => "process terminated by signal".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn python() -> Option<PythonExecutor> {
        let executor = PythonExecutor::new("python3", ExecutorLimits::default());
        executor.is_available().await.then_some(executor)
    }

    #[test]
    fn test_truncate_output() {
        assert_eq!(truncate_output(b"hello", 10), "hello");
        let truncated = truncate_output(b"hello world", 5);
        assert!(truncated.starts_with("hello"));
        assert!(truncated.ends_with("[output truncated]"));
    }

    #[test]
    fn test_error_summary() {
        let traceback = "Traceback (most recent call last):\n  File \"x.py\", line 1, in <module>\n    1/0\nZeroDivisionError: division by zero\n";
        assert_eq!(
            error_summary(traceback, Some(1)),
            "ZeroDivisionError: division by zero"
        );
        assert_eq!(error_summary("  \n", Some(3)), "process exited with status 3");
        assert_eq!(error_summary("", None), "process terminated by signal");
    }

    #[test]
    fn test_limits_from_config() {
        let config = ExecutorConfig {
            timeout_secs: 7,
            max_output_bytes: 64,
            work_dir: Some(PathBuf::from("/tmp")),
            ..ExecutorConfig::default()
        };
        let executor = PythonExecutor::from_config(&config);
        assert_eq!(executor.limits().timeout, Duration::from_secs(7));
        assert_eq!(executor.limits().max_output_bytes, 64);
        assert_eq!(executor.interpreter(), "python3");
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_error_result() {
        let executor =
            PythonExecutor::new("definitely-not-a-python-binary", ExecutorLimits::default());
        assert!(!executor.is_available().await);

        let result = executor.run("print('hi')").await;
        assert_eq!(result.output, None);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("failed to start interpreter"));
    }

    #[tokio::test]
    async fn test_print_is_captured() {
        let Some(executor) = python().await else {
            eprintln!("python3 not available, skipping");
            return;
        };
        let result = executor.run("print('hi')").await;
        assert_eq!(result.output.as_deref(), Some("hi\n"));
        assert_eq!(result.error, None);
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_division_by_zero() {
        let Some(executor) = python().await else {
            return;
        };
        let result = executor.run("1/0").await;
        assert_eq!(result.output, None);
        assert!(result.error.as_deref().unwrap().contains("division by zero"));
    }

    #[tokio::test]
    async fn test_output_before_error_is_discarded() {
        let Some(executor) = python().await else {
            return;
        };
        let result = executor.run("print('partial')\nraise ValueError('bad input')").await;
        assert_eq!(result.output, None);
        assert_eq!(result.error.as_deref(), Some("ValueError: bad input"));
    }

    #[tokio::test]
    async fn test_silent_success() {
        let Some(executor) = python().await else {
            return;
        };
        let result = executor.run("x = 1 + 1").await;
        assert!(result.is_success());
        assert_eq!(result.output, None);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let Some(executor) = python().await else {
            return;
        };
        let code = "for i in range(3):\n    print(i * i)";
        let first = executor.run(code).await;
        let second = executor.run(code).await;
        assert_eq!(first.output.as_deref(), Some("0\n1\n4\n"));
        assert_eq!(first.output, second.output);
    }

    #[tokio::test]
    async fn test_no_state_between_runs() {
        let Some(executor) = python().await else {
            return;
        };
        executor.run("leaked = 42").await;
        let result = executor.run("print(leaked)").await;
        assert!(result.error.as_deref().unwrap().contains("NameError"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let Some(base) = python().await else {
            return;
        };
        let limits = ExecutorLimits {
            timeout: Duration::from_millis(300),
            ..base.limits().clone()
        };
        let executor = PythonExecutor::new(base.interpreter(), limits);
        let result = executor.run("import time\ntime.sleep(30)").await;
        assert_eq!(result.error.as_deref(), Some("execution timed out after 300ms"));
        assert_eq!(result.exit_code, None);
        assert!(result.duration < Duration::from_secs(30));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_message_keeps_subsecond_precision() {
        let limits = ExecutorLimits {
            timeout: Duration::from_millis(250),
            work_dir: None,
            ..ExecutorLimits::default()
        };
        let executor = PythonExecutor::new("sh", limits);
        let result = executor.run("sleep 5").await;
        assert_eq!(result.error.as_deref(), Some("execution timed out after 250ms"));
    }

    #[tokio::test]
    async fn test_environment_is_scrubbed() {
        let Some(base) = python().await else {
            return;
        };
        std::env::set_var("ANALYST_TEST_SECRET", "hunter2");
        let result = base
            .run("import os\nprint(os.environ.get('ANALYST_TEST_SECRET', 'absent'))")
            .await;
        assert_eq!(result.output.as_deref(), Some("absent\n"));
    }

    #[tokio::test]
    async fn test_work_dir() {
        let Some(base) = python().await else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.csv"), "a,b\n1,2\n").unwrap();
        let limits = ExecutorLimits {
            work_dir: Some(dir.path().to_path_buf()),
            ..base.limits().clone()
        };
        let executor = PythonExecutor::new(base.interpreter(), limits);
        let result = executor.run("print(open('data.csv').read().splitlines()[1])").await;
        assert_eq!(result.output.as_deref(), Some("1,2\n"));
    }
}
