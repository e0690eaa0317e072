//! Context aggregation: one enriched prompt per request.
//!
//! Merges three inputs in a fixed section order — the raw request, top
//! historical hits from the context store, and freshly supplied source
//! records — so the same store state and request always render the same
//! bytes. Section limits come from `defaults` and are not per-call knobs.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, instrument};

use storyloom_core::defaults::{CONTEXT_HITS, CONTEXT_PREVIEW_CHARS, SOURCE_ITEMS_PER_CATEGORY};
use storyloom_core::{truncate_chars, GenerationRequest, SearchHit, SearchScope};
use storyloom_store::ContextStore;

/// Builds enriched prompts from a request plus store context.
pub struct ContextAggregator {
    store: Arc<ContextStore>,
}

impl ContextAggregator {
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self { store }
    }

    /// Retrieve historical context and render the enriched prompt.
    ///
    /// An uninitialized store contributes no history (the store already
    /// returns an empty hit list); with neither history nor fresh context
    /// the prompt degrades to the raw request text alone.
    #[instrument(skip(self, request), fields(subsystem = "pipeline", component = "aggregator", op = "enrich", prompt_len = request.prompt.len()))]
    pub async fn enrich(&self, request: &GenerationRequest) -> String {
        let hits = self
            .store
            .search(&request.prompt, SearchScope::All, CONTEXT_HITS)
            .await;
        debug!(result_count = hits.len(), "historical context retrieved");
        render(request, &hits)
    }
}

/// Pure rendering of the enriched prompt; deterministic for fixed inputs.
pub fn render(request: &GenerationRequest, hits: &[SearchHit]) -> String {
    let fresh: Vec<(&String, &Vec<storyloom_core::Record>)> = request
        .source_context
        .iter()
        .flatten()
        .filter(|(_, records)| !records.is_empty())
        .collect();

    // No context at all: hand the raw request through untouched.
    if hits.is_empty() && fresh.is_empty() {
        return request.prompt.clone();
    }

    let mut out = String::new();
    let _ = writeln!(out, "PRIMARY REQUEST: {}", request.prompt);

    if !hits.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "RELATED HISTORY:");
        for (i, hit) in hits.iter().take(CONTEXT_HITS).enumerate() {
            let preview = truncate_chars(&hit.text, CONTEXT_PREVIEW_CHARS);
            let ellipsis = if preview.len() < hit.text.len() { "..." } else { "" };
            let _ = writeln!(
                out,
                "  {}. [{}] (relevance: {:.2})",
                i + 1,
                hit.source,
                hit.similarity
            );
            let _ = writeln!(out, "     {}{}", preview.trim(), ellipsis);
        }
    }

    if !fresh.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "FRESH SOURCE DATA:");
        for (category, records) in fresh {
            let _ = writeln!(out, "  [{}] {} records:", category, records.len());
            for record in records.iter().take(SOURCE_ITEMS_PER_CATEGORY) {
                let first_line = record.text.lines().next().unwrap_or_default();
                let _ = writeln!(
                    out,
                    "    - {}",
                    truncate_chars(first_line, CONTEXT_PREVIEW_CHARS).trim()
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "TASK: Draft a detailed user story based on the primary request and \
         the context above."
    );
    out
}
