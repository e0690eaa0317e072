//! Service facade: the pipeline's external surfaces.
//!
//! [`StoryService`] wires the context store, the aggregator, and the
//! orchestrator into one explicitly constructed, explicitly passed handle.
//! Malformed input is rejected here, before anything reaches the pipeline;
//! everything below this boundary degrades instead of erroring.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use storyloom_core::{
    Collection, Error, GenerationRequest, GenerationService, Record, Result, SearchHit,
    SearchScope,
};
use storyloom_store::ContextStore;

use crate::aggregator::ContextAggregator;
use crate::config::PipelineConfig;
use crate::orchestrator::{GeneratedStory, GenerationOrchestrator};

/// One handle covering the ingestion, search, generation, and admin
/// surfaces.
pub struct StoryService {
    store: Arc<ContextStore>,
    aggregator: ContextAggregator,
    orchestrator: GenerationOrchestrator,
}

impl StoryService {
    /// Wire a service from its injected capabilities.
    pub fn new(
        store: Arc<ContextStore>,
        generation: Arc<dyn GenerationService>,
        config: PipelineConfig,
    ) -> Self {
        let aggregator = ContextAggregator::new(Arc::clone(&store));
        let orchestrator =
            GenerationOrchestrator::with_chain(generation, Arc::clone(&store), config.model_chain);
        Self {
            store,
            aggregator,
            orchestrator,
        }
    }

    /// Initialize the underlying store. Idempotent.
    pub async fn initialize(&self) -> bool {
        self.store.initialize().await
    }

    /// Observable store-initialization flag.
    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    /// Ingestion surface: store normalized records into a collection.
    pub async fn add_context(&self, collection: Collection, records: Vec<Record>) -> bool {
        self.store.add_records(collection, records).await
    }

    /// Search surface: similarity query over one collection or all.
    pub async fn search(&self, query: &str, scope: SearchScope, limit: usize) -> Vec<SearchHit> {
        self.store.search(query, scope, limit).await
    }

    /// Generation surface.
    ///
    /// The only error is boundary rejection of an empty prompt; past that
    /// point a story always comes back (backend or template). Fresh source
    /// context rides along into the enriched prompt and is also persisted
    /// into its matching collections.
    pub async fn generate_story(&self, request: GenerationRequest) -> Result<GeneratedStory> {
        if request.prompt.trim().is_empty() {
            return Err(Error::InvalidInput(
                "prompt must not be empty".to_string(),
            ));
        }

        let request_id = Uuid::now_v7();
        let span = info_span!("generate_story", request_id = %request_id);

        async {
            self.store_fresh_context(&request).await;

            let enriched = self.aggregator.enrich(&request).await;
            Ok(self
                .orchestrator
                .generate(&enriched, &request.prompt, request.has_context())
                .await)
        }
        .instrument(span)
        .await
    }

    /// Persist freshly supplied source records into their collections.
    /// Categories that do not name a known collection still enrich the
    /// prompt; they are just not stored.
    async fn store_fresh_context(&self, request: &GenerationRequest) {
        let Some(context) = &request.source_context else {
            return;
        };
        for (category, records) in context {
            if records.is_empty() {
                continue;
            }
            match Collection::from_str_loose(category) {
                Some(collection) => {
                    self.store.add_records(collection, records.clone()).await;
                }
                None => {
                    warn!(category = %category, "no collection for source category");
                }
            }
        }
    }

    /// Admin surface: per-collection record counts.
    pub async fn get_stats(&self) -> BTreeMap<String, usize> {
        self.store.stats().await
    }

    /// Admin surface: clear one collection by name. Unknown names return
    /// false instead of erroring.
    pub async fn clear_collection(&self, name: &str) -> bool {
        match Collection::from_str_loose(name) {
            Some(collection) => self.store.clear(collection).await,
            None => {
                warn!(name = %name, "clear requested for unknown collection");
                false
            }
        }
    }

    /// The ordered candidate chain (read-only).
    pub fn model_chain(&self) -> &[String] {
        self.orchestrator.chain()
    }
}
