//! Retrieval tuning: how many candidates to fetch and how strict to be.

use panel_domain::retrieval::{DEFAULT_EMERGENCY_LIMIT, DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K};

/// Parameters of the three-tier candidate retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Candidates requested from the primary and relational tiers
    pub top_k: usize,
    /// Similarity floor passed to the graph-augmented search
    pub min_similarity: f64,
    /// Candidates returned by the emergency tier
    pub emergency_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            emergency_limit: DEFAULT_EMERGENCY_LIMIT,
        }
    }
}

impl RetrievalConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_emergency_limit(mut self, limit: usize) -> Self {
        self.emergency_limit = limit;
        self
    }
}
