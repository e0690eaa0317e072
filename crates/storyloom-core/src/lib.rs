//! # storyloom-core
//!
//! Core types, traits, and abstractions for storyloom.
//!
//! This crate provides:
//! - The shared data model (collections, records, search hits, requests)
//! - Capability traits for embedding, generation, and vector persistence
//! - The crate-wide error type and `Result` alias
//! - Centralized default constants
//! - The structured logging schema
//!
//! Everything downstream (`storyloom-store`, `storyloom-inference`,
//! `storyloom-pipeline`, `storyloom-connect`) depends on this crate and
//! nothing here depends on them.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

pub use error::{Error, Result};
pub use models::{
    truncate_chars, Collection, GenerationRequest, Record, SearchHit, SearchScope, SourceContext,
    Vector,
};
pub use traits::{EmbeddingBackend, GenerationService, IndexEntry, IndexHit, VectorIndex};
