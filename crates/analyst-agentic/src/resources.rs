//! Static resource resolution
//!
//! Canned scripts are read by name from a `ResourceStore`. A failed read is
//! not an error return: it becomes `PromptArtifact::ResourceError`, which
//! the generator passes through untouched.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::prompt::PromptArtifact;

/// Text prefix used when a resource failure is rendered
pub const RESOURCE_ERROR_MARKER: &str = "Error reading file:";

/// Default delay before a static resource is returned
pub const DEFAULT_STATIC_DELAY: Duration = Duration::from_secs(2);

/// Read-by-name access to stored code artifacts
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn read(&self, name: &str) -> io::Result<String>;
}

/// Resources stored as files in one directory
#[derive(Debug, Clone)]
pub struct FileResourceStore {
    root: PathBuf,
}

impl FileResourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names are plain file names; anything that could leave `root` is refused
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let plain = !name.is_empty()
            && Path::new(name).components().count() == 1
            && !name.contains(['/', '\\'])
            && name != ".."
            && name != ".";
        if !plain {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid resource name '{}'", name),
            ));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ResourceStore for FileResourceStore {
    async fn read(&self, name: &str) -> io::Result<String> {
        let path = self.resolve(name)?;
        tokio::fs::read_to_string(&path).await
    }
}

/// Resolves canned code artifacts
#[derive(Clone)]
pub struct ResourceResolver {
    store: Arc<dyn ResourceStore>,
    delay: Duration,
}

impl ResourceResolver {
    /// Resolver with the default two-second delay
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            delay: DEFAULT_STATIC_DELAY,
        }
    }

    /// Override the delay (zero for tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Read a named resource as literal code
    pub async fn resolve_static(&self, name: &str) -> PromptArtifact {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.store.read(name).await {
            Ok(code) => {
                tracing::info!(resource = name, bytes = code.len(), "Resolved static resource");
                PromptArtifact::Code(code)
            }
            Err(e) => {
                tracing::warn!(resource = name, error = %e, "Static resource read failed");
                PromptArtifact::ResourceError(e.to_string())
            }
        }
    }
}
