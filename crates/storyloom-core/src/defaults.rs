//! Centralized default constants for the storyloom pipeline.
//!
//! **This module is the single source of truth** for all shared default
//! values. The aggregation and ingestion limits below are fixed contracts,
//! not per-call knobs: enriched-prompt output must be byte-identical for the
//! same store state and request.

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default embedding model name (Ollama).
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default embedding vector dimension for nomic-embed-text.
pub const EMBED_DIMENSION: usize = 768;

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Timeout for availability/readiness probes in seconds.
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Ordered candidate generation models, smallest/fastest first.
///
/// The ordering is a latency/local-resource policy: a 1B model answering in
/// two seconds beats a 20B model answering in forty for story drafting.
pub const MODEL_CHAIN: &[&str] = &[
    "llama3.2:1b",
    "llama3.2:3b",
    "qwen2:1.5b",
    "gemma2:2b",
    "phi3:mini",
];

// =============================================================================
// DECODING
// =============================================================================

/// Sampling temperature for story generation (low for reproducibility).
pub const GEN_TEMPERATURE: f32 = 0.3;

/// Nucleus sampling cutoff.
pub const GEN_TOP_P: f32 = 0.9;

/// Top-k sampling cutoff.
pub const GEN_TOP_K: u32 = 40;

/// Context window passed to the backend, in tokens.
pub const GEN_NUM_CTX: u32 = 2048;

// =============================================================================
// STORE
// =============================================================================

/// Maximum characters of record text kept at storage time.
/// Caps embedding cost and on-disk size for long issue bodies.
pub const RECORD_TEXT_MAX_CHARS: usize = 2000;

/// Default number of hits returned by the search surface.
pub const SEARCH_LIMIT: usize = 5;

// =============================================================================
// AGGREGATION
// =============================================================================

/// Historical search hits included in an enriched prompt.
pub const CONTEXT_HITS: usize = 3;

/// Characters of hit text shown per historical context entry.
pub const CONTEXT_PREVIEW_CHARS: usize = 200;

/// Fresh source records included per category in an enriched prompt.
pub const SOURCE_ITEMS_PER_CATEGORY: usize = 3;

// =============================================================================
// INGESTION
// =============================================================================

/// Maximum items normalized per source payload (issues, stories, ...).
pub const INGEST_ITEM_LIMIT: usize = 10;

/// Characters of item body kept by the ingestion adapters.
pub const INGEST_BODY_MAX_CHARS: usize = 500;

/// Characters of repository README kept by the ingestion adapters.
pub const INGEST_README_MAX_CHARS: usize = 1000;

// =============================================================================
// TEMPLATE FALLBACK
// =============================================================================

/// Story points for a small inferred size.
pub const POINTS_SMALL: u32 = 3;

/// Story points for the default (medium) inferred size.
pub const POINTS_MEDIUM: u32 = 5;

/// Story points for a large inferred size.
pub const POINTS_LARGE: u32 = 8;

/// Estimated hours per story point in the template estimation block.
pub const HOURS_PER_POINT: u32 = 2;

/// Characters of the raw prompt echoed into the template title line.
pub const TEMPLATE_TITLE_CHARS: usize = 60;

/// Characters of the raw prompt echoed into the template description.
pub const TEMPLATE_DESC_CHARS: usize = 40;

/// Hex characters of the prompt digest used in generated-story record ids.
pub const STORY_ID_DIGEST_CHARS: usize = 16;
