//! Candidate retrieval domain
//!
//! Request/response shapes for the search and relational collaborators, and
//! [`RetrievalOutcome`], the explicit record of which fallback tier answered.

pub mod value_objects;

pub use value_objects::{
    AgentQuery, DEFAULT_EMERGENCY_LIMIT, DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K, RetrievalOutcome,
    SearchFilters, SearchHit, SearchHitMetadata, SearchMethod, SearchRequest,
};
