//! # storyloom-store
//!
//! Multi-collection semantic context store for storyloom.
//!
//! [`ContextStore`] owns one collection per [`Collection`] variant over two
//! injected capabilities: a [`VectorIndex`] for persistence and an
//! [`EmbeddingBackend`] for vectorization. Its public surface follows the
//! pipeline's degradation contract: lower-level failures are caught, logged,
//! and surfaced as empty results or boolean failure — a store problem must
//! never crash a generation request.
//!
//! The cosine distance-to-similarity transform happens here and only here,
//! so the index metric can change without touching the aggregator or the
//! orchestrator.

pub mod memory;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use storyloom_core::defaults::RECORD_TEXT_MAX_CHARS;
use storyloom_core::{
    truncate_chars, Collection, EmbeddingBackend, IndexEntry, Record, Result, SearchHit,
    SearchScope, Vector, VectorIndex,
};

pub use memory::{cosine_similarity, MemoryIndex};

/// Durable, queryable multi-collection semantic index.
pub struct ContextStore {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingBackend>,
    initialized: AtomicBool,
}

impl ContextStore {
    /// Create a store over the given index and embedding backend.
    ///
    /// The store starts uninitialized; every operation other than
    /// [`initialize`](Self::initialize) degrades to empty/no-op until
    /// initialization succeeds.
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            index,
            embedder,
            initialized: AtomicBool::new(false),
        }
    }

    /// Create every fixed collection if absent. Idempotent and safe to call
    /// repeatedly without data loss; returns false when the index refuses.
    #[instrument(skip(self), fields(subsystem = "store", component = "context_store", op = "initialize"))]
    pub async fn initialize(&self) -> bool {
        for collection in Collection::ALL {
            if let Err(e) = self.index.ensure_collection(collection.as_str()).await {
                warn!(collection = %collection, error = %e, "store initialization failed");
                return false;
            }
        }
        let first_time = !self.initialized.swap(true, Ordering::SeqCst);
        if first_time {
            info!("context store initialized");
        }
        true
    }

    /// Observable initialization flag gating all other operations.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Insert or overwrite records by id.
    ///
    /// Empty input is a no-op (returns true). Records with empty text are
    /// skipped with a warning. Each stored record gets its text truncated to
    /// [`RECORD_TEXT_MAX_CHARS`] and an `updated_at` stamp in its metadata,
    /// so re-ingesting the same id refreshes the timestamp in place.
    #[instrument(skip(self, records), fields(subsystem = "store", component = "context_store", op = "add_records", collection = %collection, input_count = records.len()))]
    pub async fn add_records(&self, collection: Collection, records: Vec<Record>) -> bool {
        if !self.is_initialized() {
            warn!("add_records on uninitialized store");
            return false;
        }
        if records.is_empty() {
            return true;
        }

        match self.try_add(collection, records).await {
            Ok(stored) => stored > 0,
            Err(e) => {
                warn!(error = %e, "add_records failed");
                false
            }
        }
    }

    async fn try_add(&self, collection: Collection, records: Vec<Record>) -> Result<usize> {
        let now = Utc::now().to_rfc3339();

        let mut entries: Vec<(Record, String)> = Vec::with_capacity(records.len());
        for record in records {
            if record.text.trim().is_empty() {
                warn!(id = %record.id, "skipping record with empty text");
                continue;
            }
            let text = truncate_chars(&record.text, RECORD_TEXT_MAX_CHARS).to_string();
            entries.push((record, text));
        }
        if entries.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = entries.iter().map(|(_, text)| text.clone()).collect();
        let vectors = self.embedder.embed_texts(&texts).await?;

        let index_entries: Vec<IndexEntry> = entries
            .into_iter()
            .zip(vectors)
            .map(|((mut record, text), vector)| {
                if let Some(map) = record.metadata.as_object_mut() {
                    map.insert("updated_at".to_string(), now.clone().into());
                }
                IndexEntry {
                    id: record.id,
                    text,
                    metadata: record.metadata,
                    vector,
                }
            })
            .collect();

        let stored = index_entries.len();
        self.index
            .upsert(collection.as_str(), index_entries)
            .await?;
        debug!(result_count = stored, "records stored");
        Ok(stored)
    }

    /// Similarity search across one collection or all of them.
    ///
    /// Returns up to `limit` hits per targeted collection, merged and
    /// re-sorted descending by similarity, then cut to `limit` overall.
    /// Never errors: an uninitialized store, an empty query, or an index
    /// failure all yield an empty list.
    #[instrument(skip(self), fields(subsystem = "store", component = "context_store", op = "search", query = %query, limit))]
    pub async fn search(&self, query: &str, scope: SearchScope, limit: usize) -> Vec<SearchHit> {
        if !self.is_initialized() {
            debug!("search on uninitialized store");
            return Vec::new();
        }
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        let query_vector = match self.embed_query(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query embedding failed");
                return Vec::new();
            }
        };

        let mut hits: Vec<SearchHit> = Vec::new();
        for collection in scope.targets() {
            match self
                .index
                .query(collection.as_str(), &query_vector, limit)
                .await
            {
                Ok(raw) => {
                    hits.extend(raw.into_iter().map(|hit| SearchHit {
                        text: hit.text,
                        metadata: hit.metadata,
                        similarity: (1.0 - hit.distance).clamp(0.0, 1.0),
                        source: collection,
                    }));
                }
                Err(e) => {
                    warn!(collection = %collection, error = %e, "collection query failed");
                }
            }
        }

        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(limit);
        debug!(result_count = hits.len(), "search complete");
        hits
    }

    async fn embed_query(&self, query: &str) -> Result<Vector> {
        let mut vectors = self.embedder.embed_texts(&[query.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| storyloom_core::Error::Embedding("empty embedding batch".to_string()))
    }

    /// Current record count for one collection; 0 when unavailable.
    pub async fn count(&self, collection: Collection) -> usize {
        if !self.is_initialized() {
            return 0;
        }
        match self.index.count(collection.as_str()).await {
            Ok(n) => n,
            Err(e) => {
                warn!(collection = %collection, error = %e, "count failed");
                0
            }
        }
    }

    /// Record counts for every collection. Reflects add/clear immediately.
    pub async fn stats(&self) -> BTreeMap<String, usize> {
        let mut stats = BTreeMap::new();
        if !self.is_initialized() {
            return stats;
        }
        for collection in Collection::ALL {
            stats.insert(collection.as_str().to_string(), self.count(collection).await);
        }
        stats
    }

    /// Delete every record in the collection. The collection remains
    /// queryable (empty) afterward.
    #[instrument(skip(self), fields(subsystem = "store", component = "context_store", op = "clear", collection = %collection))]
    pub async fn clear(&self, collection: Collection) -> bool {
        if !self.is_initialized() {
            warn!("clear on uninitialized store");
            return false;
        }
        match self.index.clear(collection.as_str()).await {
            Ok(()) => {
                info!("collection cleared");
                true
            }
            Err(e) => {
                warn!(error = %e, "clear failed");
                false
            }
        }
    }
}
