//! Pipeline configuration.

use tracing::warn;

use storyloom_core::defaults::MODEL_CHAIN;

/// Configuration for the generation pipeline.
///
/// Read once at startup; the chain is read-only afterward.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ordered candidate models, smallest/fastest first.
    pub model_chain: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_chain: MODEL_CHAIN.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with fallback to
    /// defaults. Reads `.env` when present.
    ///
    /// `STORYLOOM_MODEL_CHAIN` is a comma-separated ordered model list;
    /// blank entries are dropped, an entirely blank value keeps the default
    /// chain.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(val) = std::env::var("STORYLOOM_MODEL_CHAIN") {
            let chain: Vec<String> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if chain.is_empty() {
                warn!(value = %val, "Invalid STORYLOOM_MODEL_CHAIN, using default");
            } else {
                config.model_chain = chain;
            }
        }

        config
    }
}
