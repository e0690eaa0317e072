//! # storyloom-inference
//!
//! Local LLM inference backends for storyloom.
//!
//! This crate provides:
//! - [`OllamaClient`]: the default backend, implementing both the
//!   [`EmbeddingBackend`](storyloom_core::EmbeddingBackend) and the
//!   multi-model [`GenerationService`](storyloom_core::GenerationService)
//!   capabilities over one local Ollama server
//! - Deterministic mock backends (feature `mock`) for cross-crate tests
//!
//! # Feature Flags
//!
//! - `ollama` (default): Enable the Ollama backend
//! - `mock`: Enable the mock backends
//! - `integration`: Enable tests that require a live Ollama server
//!
//! # Example
//!
//! ```rust,no_run
//! use storyloom_inference::OllamaClient;
//! use storyloom_core::EmbeddingBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = OllamaClient::from_env();
//!     let texts = vec!["Hello".to_string()];
//!     let embeddings = client.embed_texts(&texts).await.unwrap();
//!     assert_eq!(embeddings.len(), 1);
//! }
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEmbeddingBackend, MockEmbeddingGenerator, MockGenerationService};
