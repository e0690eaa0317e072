//! # storyloom-pipeline
//!
//! Context aggregation and generation orchestration for storyloom.
//!
//! This crate provides:
//! - [`ContextAggregator`]: merges a request with store context into one
//!   deterministic enriched prompt
//! - [`GenerationOrchestrator`]: walks an ordered backend chain with
//!   graceful degradation and an attempt trace
//! - [`fallback`]: the rule-based template story generator (never fails)
//! - [`StoryService`]: the facade exposing the ingestion, search,
//!   generation, and admin surfaces
//!
//! Control flow per request: the aggregator pulls historical context from
//! the store and merges it with any fresh source records, the orchestrator
//! tries backends in order (template on exhaustion), and the result is
//! written back into the generated-stories collection.

pub mod aggregator;
pub mod config;
pub mod fallback;
pub mod orchestrator;
pub mod service;

pub use aggregator::ContextAggregator;
pub use config::PipelineConfig;
pub use fallback::{infer_priority, infer_role, infer_size, render_story, Priority, Role, SizeTier};
pub use orchestrator::{
    story_id, Attempt, AttemptOutcome, GeneratedStory, GenerationOrchestrator, StoryOrigin,
};
pub use service::StoryService;
