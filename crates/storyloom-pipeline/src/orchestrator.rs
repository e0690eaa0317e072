//! Ordered backend chain with deterministic template fallback.
//!
//! The orchestrator walks its candidate models smallest-first against one
//! [`GenerationService`]. Per candidate: availability probe, readiness
//! probe, then invocation; any failure moves to the next candidate and is
//! recorded in the attempt trace. Exhaustion is not an error — the template
//! path renders a story unconditionally. Successful output (either path) is
//! persisted into the generated-stories collection.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use storyloom_core::defaults::{MODEL_CHAIN, STORY_ID_DIGEST_CHARS};
use storyloom_core::{Collection, GenerationService, Record};
use storyloom_store::ContextStore;

use crate::fallback;

/// Outcome of one candidate in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Service-level availability probe failed.
    SkippedUnavailable,
    /// Service up, but this model variant is not loaded.
    SkippedNotReady,
    /// Invocation started and errored.
    Failed,
    /// Invocation produced text; the chain stops here.
    Succeeded,
}

/// One entry in the per-call attempt trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub model: String,
    pub outcome: AttemptOutcome,
}

/// Where the final text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryOrigin {
    /// A backend produced the text; carries the model identifier.
    Backend(String),
    /// Every candidate was exhausted; the template path produced the text.
    Template,
}

impl StoryOrigin {
    /// Stable string form used in persisted metadata.
    pub fn as_metadata(&self) -> String {
        match self {
            StoryOrigin::Backend(model) => format!("backend:{}", model),
            StoryOrigin::Template => "template".to_string(),
        }
    }
}

/// Result of one `generate` call. `attempts` lists every candidate tried,
/// in chain order, ending with the succeeding one (empty on the pure
/// template path with an unavailable service chain of zero candidates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStory {
    pub text: String,
    pub origin: StoryOrigin,
    pub attempts: Vec<Attempt>,
}

/// Best-effort text generation over an ordered candidate chain.
pub struct GenerationOrchestrator {
    service: Arc<dyn GenerationService>,
    store: Arc<ContextStore>,
    chain: Vec<String>,
}

impl GenerationOrchestrator {
    /// Create an orchestrator with the default model chain.
    pub fn new(service: Arc<dyn GenerationService>, store: Arc<ContextStore>) -> Self {
        Self::with_chain(
            service,
            store,
            MODEL_CHAIN.iter().map(|m| m.to_string()).collect(),
        )
    }

    /// Create an orchestrator with a custom ordered chain.
    pub fn with_chain(
        service: Arc<dyn GenerationService>,
        store: Arc<ContextStore>,
        chain: Vec<String>,
    ) -> Self {
        Self {
            service,
            store,
            chain,
        }
    }

    /// The candidate chain, in attempt order. Read-only after startup.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Generate a story for `enriched_prompt`, falling back to the template
    /// over `raw_prompt` when every candidate is exhausted. Never fails.
    ///
    /// `has_context` records whether fresh source data accompanied the
    /// request; it lands in the persisted story's metadata.
    #[instrument(skip(self, enriched_prompt, raw_prompt), fields(subsystem = "pipeline", component = "orchestrator", op = "generate", prompt_len = enriched_prompt.len()))]
    pub async fn generate(
        &self,
        enriched_prompt: &str,
        raw_prompt: &str,
        has_context: bool,
    ) -> GeneratedStory {
        let mut attempts: Vec<Attempt> = Vec::with_capacity(self.chain.len());
        let mut result: Option<(String, StoryOrigin)> = None;

        for model in &self.chain {
            debug!(model = %model, "trying candidate");

            if !self.service.is_available().await {
                warn!(model = %model, "generation service unavailable, skipping");
                attempts.push(Attempt {
                    model: model.clone(),
                    outcome: AttemptOutcome::SkippedUnavailable,
                });
                continue;
            }
            if !self.service.is_ready(model).await {
                debug!(model = %model, "model not ready, skipping");
                attempts.push(Attempt {
                    model: model.clone(),
                    outcome: AttemptOutcome::SkippedNotReady,
                });
                continue;
            }

            match self.service.generate(model, enriched_prompt).await {
                Ok(text) => {
                    info!(model = %model, response_len = text.len(), "generation succeeded");
                    attempts.push(Attempt {
                        model: model.clone(),
                        outcome: AttemptOutcome::Succeeded,
                    });
                    result = Some((text, StoryOrigin::Backend(model.clone())));
                    break;
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "generation failed, trying next");
                    attempts.push(Attempt {
                        model: model.clone(),
                        outcome: AttemptOutcome::Failed,
                    });
                }
            }
        }

        let (text, origin) = result.unwrap_or_else(|| {
            info!("all candidates exhausted, using template fallback");
            (fallback::render_story(raw_prompt), StoryOrigin::Template)
        });

        self.persist(&text, raw_prompt, has_context, &origin).await;

        GeneratedStory {
            text,
            origin,
            attempts,
        }
    }

    /// Store the generated story. Best-effort: a store problem is logged
    /// and must not fail the request that already has its text.
    async fn persist(&self, text: &str, raw_prompt: &str, has_context: bool, origin: &StoryOrigin) {
        let record = Record::new(
            story_id(raw_prompt),
            text,
            json!({
                "type": "generated_story",
                "prompt": raw_prompt,
                "has_context": has_context,
                "origin": origin.as_metadata(),
                "created_at": Utc::now().to_rfc3339(),
            }),
        );

        if !self
            .store
            .add_records(Collection::GeneratedStories, vec![record])
            .await
        {
            warn!("generated story was not persisted");
        }
    }
}

/// Deterministic record id for a generated story.
///
/// Derived from the raw prompt, so regenerating the same request overwrites
/// its stored story instead of accumulating near-duplicates.
pub fn story_id(raw_prompt: &str) -> String {
    let digest = Sha256::digest(raw_prompt.as_bytes());
    format!("story_{}", &hex::encode(digest)[..STORY_ID_DIGEST_CHARS])
}
