//! Mock inference backends for deterministic testing.
//!
//! Provides mock implementations of the embedding and generation
//! capabilities with scripted availability, readiness, and responses, plus
//! a deterministic embedding generator so similarity-ranking tests are
//! reproducible without a live model server.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use storyloom_core::{EmbeddingBackend, Error, GenerationService, Result, Vector};

// =============================================================================
// EMBEDDING
// =============================================================================

/// Deterministic embedding generator.
pub struct MockEmbeddingGenerator;

impl MockEmbeddingGenerator {
    /// Generate a deterministic embedding from text.
    ///
    /// Uses character-based hashing for reproducibility. The same text
    /// always produces the same embedding, and texts sharing vocabulary
    /// land closer together than unrelated texts.
    pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension.max(1)];
        let len = vec.len();

        for word in text.to_lowercase().split_whitespace() {
            // stable per-word bucket plus per-char spread
            let mut bucket: usize = 0;
            for c in word.chars() {
                bucket = bucket.wrapping_mul(31).wrapping_add(c as usize);
            }
            vec[bucket % len] += 1.0;
            for (i, c) in word.chars().enumerate() {
                vec[(c as usize + i) % len] += 0.1;
            }
        }

        Self::normalize(&mut vec);
        vec
    }

    fn normalize(vec: &mut [f32]) {
        let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vec.iter_mut().for_each(|x| *x /= magnitude);
        }
    }

    /// Cosine similarity between two vectors.
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if mag_a > 0.0 && mag_b > 0.0 {
            dot / (mag_a * mag_b)
        } else {
            0.0
        }
    }
}

/// Mock [`EmbeddingBackend`] producing deterministic vectors.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    failure_rate: f64,
}

impl MockEmbeddingBackend {
    pub fn new() -> Self {
        Self {
            dimension: 384,
            failure_rate: 0.0,
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        self.failure_rate > 0.0 && rand::thread_rng().gen::<f64>() < self.failure_rate
    }
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if self.should_fail() {
            return Err(Error::Embedding("simulated failure".to_string()));
        }
        Ok(texts
            .iter()
            .map(|t| Vector::from(MockEmbeddingGenerator::generate(t, self.dimension)))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

// =============================================================================
// GENERATION
// =============================================================================

/// One logged call against the mock generation service.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub model: String,
    pub input: String,
}

#[derive(Debug, Clone)]
struct MockGenConfig {
    available: bool,
    ready_models: HashSet<String>,
    responses: HashMap<String, String>,
    failing_models: HashSet<String>,
    default_response: String,
}

impl Default for MockGenConfig {
    fn default() -> Self {
        Self {
            available: true,
            ready_models: HashSet::new(),
            responses: HashMap::new(),
            failing_models: HashSet::new(),
            default_response: "Mock story".to_string(),
        }
    }
}

/// Mock [`GenerationService`] with scripted availability and readiness.
///
/// Models behave per-script: unlisted models are not ready, listed models
/// answer with their mapped response (or the default), and models in the
/// failing set error on invocation — exercising every skip/fail edge of the
/// orchestrator chain.
#[derive(Clone)]
pub struct MockGenerationService {
    config: Arc<MockGenConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationService {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockGenConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script whether the service itself is reachable.
    pub fn with_available(mut self, available: bool) -> Self {
        Arc::make_mut(&mut self.config).available = available;
        self
    }

    /// Mark a model variant as loaded.
    pub fn with_ready_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).ready_models.insert(model.into());
        self
    }

    /// Map a model to a fixed response (also marks it ready).
    pub fn with_response(mut self, model: impl Into<String>, response: impl Into<String>) -> Self {
        let model = model.into();
        let config = Arc::make_mut(&mut self.config);
        config.ready_models.insert(model.clone());
        config.responses.insert(model, response.into());
        self
    }

    /// Mark a model ready but failing on invocation.
    pub fn with_failing_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        let config = Arc::make_mut(&mut self.config);
        config.ready_models.insert(model.clone());
        config.failing_models.insert(model);
        self
    }

    /// Set the response used for ready models without a mapping.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// All logged calls, for assertions.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of generate invocations (excludes probes).
    pub fn generate_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "generate")
            .count()
    }

    fn log_call(&self, operation: &str, model: &str, input: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            model: model.to_string(),
            input: input.to_string(),
        });
    }
}

impl Default for MockGenerationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationService {
    async fn is_available(&self) -> bool {
        self.log_call("is_available", "", "");
        self.config.available
    }

    async fn is_ready(&self, model: &str) -> bool {
        self.log_call("is_ready", model, "");
        self.config.available && self.config.ready_models.contains(model)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.log_call("generate", model, prompt);

        if !self.config.available {
            return Err(Error::Inference("service unavailable".to_string()));
        }
        if self.config.failing_models.contains(model) {
            return Err(Error::Inference(format!("model {} exploded", model)));
        }
        Ok(self
            .config
            .responses
            .get(model)
            .cloned()
            .unwrap_or_else(|| self.config.default_response.clone()))
    }
}
