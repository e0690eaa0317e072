//! Shared data model for the storyloom pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// =============================================================================
// VECTOR
// =============================================================================

/// Dense embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector(Vec<f32>);

impl Vector {
    /// View the raw components.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the vector has no components.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for Vector {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Named partition of the semantic store.
///
/// The set is fixed at compile time; each collection is its own embedding
/// space and record-id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Normalized GitHub repository/issue/pull-request records.
    GithubData,
    /// Normalized Rally story/feature/defect records.
    RallyData,
    /// Stories previously produced by the orchestrator.
    GeneratedStories,
}

impl Collection {
    /// Every collection, in stats/display order.
    pub const ALL: [Collection; 3] = [
        Collection::GithubData,
        Collection::RallyData,
        Collection::GeneratedStories,
    ];

    /// Canonical string form (stable, used as index collection name).
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::GithubData => "github_data",
            Collection::RallyData => "rally_data",
            Collection::GeneratedStories => "generated_stories",
        }
    }

    /// Parse a collection name (case-insensitive, accepts hyphens).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "github_data" | "github" => Some(Collection::GithubData),
            "rally_data" | "rally" => Some(Collection::RallyData),
            "generated_stories" | "stories" => Some(Collection::GeneratedStories),
            _ => None,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Search target: a single collection or every collection at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    One(Collection),
    All,
}

impl SearchScope {
    /// The concrete collections this scope targets, in fixed order.
    pub fn targets(&self) -> Vec<Collection> {
        match self {
            SearchScope::One(c) => vec![*c],
            SearchScope::All => Collection::ALL.to_vec(),
        }
    }
}

// =============================================================================
// RECORDS & HITS
// =============================================================================

/// One stored unit of textual knowledge.
///
/// `id` is deterministic per logical source entity, so re-ingesting the same
/// item overwrites instead of duplicating. `metadata` holds scalar fields
/// only and never participates in similarity scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    pub metadata: JsonValue,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: JsonValue) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }
}

/// Ranked result of a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub text: String,
    pub metadata: JsonValue,
    /// 1 - cosine distance, in [0, 1]. Ranking/display only; not comparable
    /// across embedding models.
    pub similarity: f32,
    pub source: Collection,
}

// =============================================================================
// GENERATION REQUEST
// =============================================================================

/// Freshly supplied source records, grouped by external category name.
///
/// BTreeMap keeps category iteration order stable so enriched prompts are
/// byte-identical for the same input.
pub type SourceContext = BTreeMap<String, Vec<Record>>;

/// One story-generation request as it enters the pipeline.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Raw requirement text, verbatim.
    pub prompt: String,
    /// Fresh records from the ingestion adapters, if any were fetched.
    pub source_context: Option<SourceContext>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            source_context: None,
        }
    }

    pub fn with_context(mut self, context: SourceContext) -> Self {
        self.source_context = Some(context);
        self
    }

    /// True when at least one category carries at least one record.
    pub fn has_context(&self) -> bool {
        self.source_context
            .as_ref()
            .is_some_and(|c| c.values().any(|v| !v.is_empty()))
    }
}

// =============================================================================
// TEXT HELPERS
// =============================================================================

/// Truncate to at most `max` characters, on a char boundary.
///
/// Char-based (not byte-based) so multi-byte text such as Vietnamese
/// requirements is never split mid-codepoint.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
