//! Core traits for storyloom abstractions.
//!
//! These traits define the capability seams the pipeline depends on,
//! enabling pluggable backends and testability: vectorization
//! ([`EmbeddingBackend`]), persistence ([`VectorIndex`]), and text
//! generation ([`GenerationService`]).

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::Vector;

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns one vector per input text, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Local text-generation service hosting a set of model variants.
///
/// The orchestrator walks its candidate chain against one service handle:
/// availability is a service-level probe, readiness is per model variant,
/// and both are cheap bounded-timeout checks that can never hang a request
/// past the probe timeout.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Is the generation service itself reachable?
    async fn is_available(&self) -> bool;

    /// Is the named model variant loaded and usable?
    async fn is_ready(&self, model: &str) -> bool;

    /// Generate text from `prompt` with the named model variant.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

// =============================================================================
// VECTOR INDEX TRAITS
// =============================================================================

/// One entry handed to the index for storage.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: String,
    pub text: String,
    pub metadata: JsonValue,
    pub vector: Vector,
}

/// One raw index match. `distance` is cosine distance; the
/// distance-to-similarity transform is applied by the store layer, never
/// here, so the metric can be swapped without touching callers.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub id: String,
    pub text: String,
    pub metadata: JsonValue,
    pub distance: f32,
}

/// Persistence capability of the semantic store.
///
/// Implementations own durability and nearest-neighbor lookup per named
/// collection; they know nothing about the fixed collection set, record
/// semantics, or similarity scores.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the named collection if it does not exist. Idempotent.
    async fn ensure_collection(&self, collection: &str) -> Result<()>;

    /// Insert or overwrite entries by id.
    async fn upsert(&self, collection: &str, entries: Vec<IndexEntry>) -> Result<()>;

    /// Return up to `limit` nearest entries, ascending by distance.
    async fn query(&self, collection: &str, vector: &Vector, limit: usize)
        -> Result<Vec<IndexHit>>;

    /// Number of entries currently stored in the collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Delete every entry in the collection, keeping it queryable.
    async fn clear(&self, collection: &str) -> Result<()>;
}
