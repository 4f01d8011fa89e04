//! Ranking weights.
//!
//! The ranker combines four sub-scores with fixed weights. They live in a
//! config struct so they can be tuned from the config file and tested apart
//! from the combining logic.

use serde::{Deserialize, Serialize};

/// Weights for the four ranking sub-scores
///
/// Domain relevance and capability match carry the most weight, tier
/// preference the least. The ranker divides by [`RankingWeights::total`],
/// so only the ratios matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    pub semantic_similarity: f64,
    pub domain_relevance: f64,
    pub tier_preference: f64,
    pub capability_match: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            semantic_similarity: 0.20,
            domain_relevance: 0.35,
            tier_preference: 0.10,
            capability_match: 0.35,
        }
    }
}

impl RankingWeights {
    /// Sum of all weights
    pub fn total(&self) -> f64 {
        self.semantic_similarity + self.domain_relevance + self.tier_preference + self.capability_match
    }

    /// Weights are usable when none is negative or non-finite and their sum is positive.
    pub fn is_valid(&self) -> bool {
        let all = [
            self.semantic_similarity,
            self.domain_relevance,
            self.tier_preference,
            self.capability_match,
        ];
        all.iter().all(|w| w.is_finite() && *w >= 0.0) && self.total() > 0.0
    }
}
