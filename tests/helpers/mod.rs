//! Shared fakes for session loop tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use analyst_agentic::{
    CodeGenerator, CompletionRequest, FileResourceStore, LlmClient, PromptBuilder, PromptTemplate,
    ResourceResolver,
};
use data_analyst::{CodeExecutor, ExecutionResult, SessionLoop};

/// LLM client returning a fixed reply and recording every prompt
pub struct MockLlmClient {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.reply.clone().map_err(|e| anyhow!(e))
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}

/// Executor that records code instead of running it
pub struct StubExecutor {
    result: ExecutionResult,
    runs: Mutex<Vec<String>>,
}

impl StubExecutor {
    pub fn succeeding(output: &str) -> Arc<Self> {
        Arc::new(Self {
            result: ExecutionResult::success(output.to_string(), Some(0), Duration::from_millis(3)),
            runs: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Arc::new(Self {
            result: ExecutionResult::failure(error, Some(1), Duration::from_millis(3)),
            runs: Mutex::new(Vec::new()),
        })
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeExecutor for StubExecutor {
    async fn run(&self, code: &str) -> ExecutionResult {
        self.runs.lock().unwrap().push(code.to_string());
        self.result.clone()
    }
}

/// Session loop over a resource directory, with no static delay
pub fn session_loop(
    resources: &Path,
    client: Arc<MockLlmClient>,
    executor: Arc<StubExecutor>,
) -> SessionLoop {
    let resolver = ResourceResolver::new(Arc::new(FileResourceStore::new(resources)))
        .with_delay(Duration::ZERO);
    let builder = PromptBuilder::new(resolver, PromptTemplate::default());
    let generator = CodeGenerator::with_client(client);
    SessionLoop::new(builder, generator, executor, "mock-model", 1000)
}

/// Temp resource directory containing `cpi.py`
pub fn resources_with_cpi(code: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cpi.py"), code).unwrap();
    dir
}
