//! Graph-augmented agent search port
//!
//! The primary retrieval tier: vector similarity expanded through the
//! knowledge graph. Any error sends the caller down the relational fallback.

use async_trait::async_trait;
use panel_domain::{SearchHit, SearchRequest};
use thiserror::Error;

/// Errors from the graph-augmented search collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The search backend reported itself unavailable
    #[error("GraphRAG search unavailable: {0}")]
    Unavailable(String),

    #[error("GraphRAG search request failed: {0}")]
    Request(String),

    #[error("GraphRAG search timed out")]
    Timeout,
}

/// Ranked search over agent profiles
#[async_trait]
pub trait AgentSearchPort: Send + Sync {
    /// Hits ordered by descending similarity, at most `request.top_k` of them
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError>;
}
