//! Raw TOML configuration structures
//!
//! Each section of the config file maps to one `File*Config` struct. All
//! sections are optional and fall back to their defaults.
//!
//! ```toml
//! [llm]
//! model = "gpt-4o-mini"
//!
//! [search]
//! supabase_url = "https://xyz.supabase.co"
//! top_k = 5
//!
//! [ranking]
//! domain_relevance = 0.4
//! ```

mod llm;
mod output;
mod panel;
mod retrieval;

pub use llm::FileLlmConfig;
pub use output::{FileMetricsConfig, FileOutputConfig, FileOutputFormat};
pub use panel::{FileBehaviorConfig, FilePanelConfig};
pub use retrieval::{FileCatalogConfig, FileCircuitBreakerConfig, FileSearchConfig};

use panel_domain::{RankingWeights, StrategyScoring};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("search.top_k must be at least 1")]
    InvalidTopK,

    #[error("search.emergency_limit must be at least 1")]
    InvalidEmergencyLimit,

    #[error("search.min_similarity must be within 0.0..=1.0, got {0}")]
    InvalidSimilarity(f64),

    #[error("ranking weights must be non-negative with a positive sum")]
    InvalidRankingWeights,

    #[error("circuit_breaker thresholds must be at least 1")]
    InvalidCircuitBreaker,

    #[error("panel.size must be at least 1")]
    InvalidPanelSize,

    #[error("llm.endpoint cannot be empty")]
    EmptyEndpoint,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub llm: FileLlmConfig,
    pub search: FileSearchConfig,
    pub circuit_breaker: FileCircuitBreakerConfig,
    pub behavior: FileBehaviorConfig,
    /// Ranker sub-score weights
    pub ranking: RankingWeights,
    /// Strategy auto-selection scoring
    pub synthesis: StrategyScoring,
    pub panel: FilePanelConfig,
    pub catalog: FileCatalogConfig,
    pub metrics: FileMetricsConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // Timeout of 0 seconds doesn't make sense
        if let Some(0) = self.behavior.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.circuit_breaker.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.circuit_breaker.failure_threshold == 0 || self.circuit_breaker.success_threshold == 0
        {
            return Err(ConfigValidationError::InvalidCircuitBreaker);
        }
        if self.search.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK);
        }
        if self.search.emergency_limit == 0 {
            return Err(ConfigValidationError::InvalidEmergencyLimit);
        }
        if !(0.0..=1.0).contains(&self.search.min_similarity) {
            return Err(ConfigValidationError::InvalidSimilarity(
                self.search.min_similarity,
            ));
        }
        if !self.ranking.is_valid() {
            return Err(ConfigValidationError::InvalidRankingWeights);
        }
        if self.panel.size == 0 {
            return Err(ConfigValidationError::InvalidPanelSize);
        }
        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigValidationError::EmptyEndpoint);
        }
        Ok(())
    }
}
