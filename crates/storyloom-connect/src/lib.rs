//! # storyloom-connect
//!
//! Source payload normalization adapters for storyloom.
//!
//! The pipeline core never talks to GitHub or Rally itself; callers fetch
//! payloads however they like and hand the JSON here. Each adapter turns a
//! payload into `Record`s with:
//! - a deterministic id per logical source item (re-ingestion overwrites)
//! - text bounded before handoff
//! - failures as explicit `Err` values, never panics into the core
//!
//! Normalized records are stored via the ingestion surface
//! (`StoryService::add_context`) or passed as fresh source context on a
//! generation request.

pub mod github;
pub mod rally;

pub use github::{normalize_issues, normalize_pull_requests, normalize_repository};
pub use rally::{
    normalize_defects, normalize_features, normalize_stories, normalize_work_items, WorkItemKind,
};
