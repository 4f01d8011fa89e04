//! Domain layer for expert-panel
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Selection
//!
//! A question is analyzed into a [`QueryAnalysis`], candidate [`Agent`]s are
//! retrieved (see [`RetrievalOutcome`] for which tier answered), scored by the
//! pure [`rank_agents`] heuristic and the best one is picked by
//! [`select_best_agent`].
//!
//! ## Synthesis
//!
//! Answers from several agents are merged by the [`ResponseSynthesizer`]
//! using a named strategy from the [`StrategyRegistry`], after conflicting
//! answers have been detected and resolved.

pub mod agent;
pub mod analysis;
pub mod config;
pub mod core;
pub mod pipeline;
pub mod prompt;
pub mod ranking;
pub mod retrieval;
pub mod selection;
pub mod synthesis;

// Re-export commonly used types
pub use agent::{Agent, AgentStatus, DomainExpertise};
pub use analysis::{AnalysisParseError, Complexity, QueryAnalysis, parse_analysis_response};
pub use config::OutputFormat;
pub use core::{
    error::{DomainError, validate_query},
    model::Model,
};
pub use pipeline::Phase;
pub use prompt::PromptTemplate;
pub use ranking::{AgentRanking, RankingWeights, ScoreBreakdown, rank_agents, rank_agents_with_weights};
pub use retrieval::{
    AgentQuery, RetrievalOutcome, SearchFilters, SearchHit, SearchHitMetadata, SearchMethod,
    SearchRequest,
};
pub use selection::{AgentSelectionError, SelectionResult, select_best_agent};
pub use synthesis::{
    AgentResponse, ConflictResolution, ConflictSeverity, ConflictType, DetailLevel,
    ResponseFormat, ResponseSource, ResponseSynthesizer, StrategyChoice, StrategyRegistry,
    StrategyScoring, SynthesisContext, SynthesisError, SynthesisMetadata, SynthesizedResponse,
    UserPreferences,
};
