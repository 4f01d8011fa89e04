//! Agent ranking domain
//!
//! A pure weighted-feature model: four sub-scores in `0.0..=1.0`
//! (semantic similarity, domain relevance, tier preference, capability
//! match) combined with [`RankingWeights`].

pub mod ranker;
pub mod weights;

pub use ranker::{AgentRanking, ScoreBreakdown, rank_agents, rank_agents_with_weights};
pub use weights::RankingWeights;
