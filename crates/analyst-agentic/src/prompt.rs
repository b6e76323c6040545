//! Prompt construction
//!
//! Turns a routed query into the artifact handed to the generator: literal
//! code for static intents, an instruction for the model otherwise.

use std::borrow::Cow;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use crate::resources::{ResourceResolver, RESOURCE_ERROR_MARKER};

/// Resource returned for `Intent::StaticResource`
pub const STATIC_RESOURCE_NAME: &str = "cpi.py";

/// What the caller says an untagged input is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Program text, run as-is
    Code,
    /// Free text for the model
    Instruction,
}

impl InputKind {
    /// `.py` files are code; anything else is an instruction
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("py") => InputKind::Code,
            _ => InputKind::Instruction,
        }
    }
}

/// The value handed to the generation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum PromptArtifact {
    /// Literal code, bypasses the model
    Code(String),
    /// Static resource could not be read; carries the failure detail
    ResourceError(String),
    /// Instruction for the model
    Instruction(String),
}

impl PromptArtifact {
    /// Lift untagged input (files, stdin) into an artifact of the given kind
    ///
    /// A rendered resource error is recognized by its marker and stays an
    /// error whatever the kind.
    pub fn from_raw(raw: &str, kind: InputKind) -> Self {
        if let Some(detail) = raw.strip_prefix(RESOURCE_ERROR_MARKER) {
            return PromptArtifact::ResourceError(detail.trim_start().to_string());
        }
        match kind {
            InputKind::Code => PromptArtifact::Code(raw.to_string()),
            InputKind::Instruction => PromptArtifact::Instruction(raw.to_string()),
        }
    }

    /// True when no model call is needed
    pub fn is_passthrough(&self) -> bool {
        !matches!(self, PromptArtifact::Instruction(_))
    }

    /// Text form; resource errors carry the error marker
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            PromptArtifact::Code(code) => Cow::Borrowed(code),
            PromptArtifact::Instruction(prompt) => Cow::Borrowed(prompt),
            PromptArtifact::ResourceError(detail) => {
                Cow::Owned(format!("{} {}", RESOURCE_ERROR_MARKER, detail))
            }
        }
    }
}

impl std::fmt::Display for PromptArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Wording of the generation prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    /// Local data file described to the model for templated queries
    pub data_file: String,
    /// Column schema of `data_file`
    pub data_columns: Vec<String>,
    /// Label used when naming the data set
    pub data_label: String,
    /// Rendering constraint for plots
    pub render_hint: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            data_file: "hsi.2024.csv".to_string(),
            data_columns: ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            data_label: "HSI".to_string(),
            render_hint: "Print results to stdout. Save figures with fig.savefig(...) in the \
                          working directory instead of calling plt.show()."
                .to_string(),
        }
    }
}

impl PromptTemplate {
    const CODE_ONLY: &'static str =
        "Only provide the code, no explanations, no beginning ```python and ending ```:";

    /// Prompt for queries about the known data source
    pub fn templated(&self, query: &str) -> String {
        format!(
            "You have the market data in file {file} with column {columns}.\n\
             You can read {label} market data from file {file}.\n\
             Generate Python code for the following requirement.\n\
             Important: {hint}\n\
             {code_only} {query}",
            file = self.data_file,
            columns = self.data_columns.join(","),
            label = self.data_label,
            hint = self.render_hint,
            code_only = Self::CODE_ONLY,
            query = query,
        )
    }

    /// Prompt for everything else
    pub fn freeform(&self, query: &str) -> String {
        format!(
            "Generate Python code for the following requirement.\n\
             Important: {hint}\n\
             {code_only} {query}",
            hint = self.render_hint,
            code_only = Self::CODE_ONLY,
            query = query,
        )
    }
}

/// Builds the artifact for a classified query
#[derive(Clone)]
pub struct PromptBuilder {
    resolver: ResourceResolver,
    template: PromptTemplate,
}

impl PromptBuilder {
    pub fn new(resolver: ResourceResolver, template: PromptTemplate) -> Self {
        Self { resolver, template }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub async fn build(&self, intent: Intent, query: &str) -> PromptArtifact {
        match intent {
            Intent::StaticResource => self.resolver.resolve_static(STATIC_RESOURCE_NAME).await,
            Intent::TemplatedGeneration => {
                PromptArtifact::Instruction(self.template.templated(query))
            }
            Intent::FreeformGeneration => PromptArtifact::Instruction(self.template.freeform(query)),
        }
    }
}
