//! Query routing
//!
//! Decides how a research question becomes code. Routing is a coarse
//! keyword heuristic: the lowered query is tested against an ordered list of
//! rules and the first match wins.

use serde::{Deserialize, Serialize};

/// Keywords answered by the canned CPI script
pub const STATIC_KEYWORDS: &[&str] = &["cpi", "consumer price index", "inflation"];

/// Keywords answered by the templated prompt over the local HSI data file
pub const TEMPLATED_KEYWORDS: &[&str] = &["hsi", "sharpe", "sharpe ratio", "return"];

/// Routing decision for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Answer with a bundled script, no model call
    StaticResource,
    /// Generate with a prompt that describes a known data source
    TemplatedGeneration,
    /// Generate from the query alone
    FreeformGeneration,
}

impl Intent {
    /// Whether this intent needs the generative model
    pub fn requires_generation(&self) -> bool {
        !matches!(self, Intent::StaticResource)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::StaticResource => "StaticResource",
            Intent::TemplatedGeneration => "TemplatedGeneration",
            Intent::FreeformGeneration => "FreeformGeneration",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowered.contains(k))
}

/// Rule 1: the query asks about consumer prices
pub fn mentions_static_topic(lowered: &str) -> bool {
    contains_any(lowered, STATIC_KEYWORDS)
}

/// Rule 2: the query asks about HSI market data or return metrics
pub fn mentions_market_data(lowered: &str) -> bool {
    contains_any(lowered, TEMPLATED_KEYWORDS)
}

type Predicate = fn(&str) -> bool;

/// Evaluated top-down; order is the tie-break
pub const ROUTING_RULES: &[(Predicate, Intent)] = &[
    (mentions_static_topic, Intent::StaticResource),
    (mentions_market_data, Intent::TemplatedGeneration),
];

/// Classify a free-text query
pub fn classify(query: &str) -> Intent {
    let lowered = query.to_lowercase();
    ROUTING_RULES
        .iter()
        .find(|(matches, _)| matches(&lowered))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::FreeformGeneration)
}
