//! Relational agent store port
//!
//! A read-only, filterable view over the persisted agents collection used by
//! the fallback retrieval tiers.

use async_trait::async_trait;
use panel_domain::{Agent, AgentQuery};
use thiserror::Error;

/// Errors from the relational store or its circuit breaker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Agent store query failed: {0}")]
    Query(String),

    /// The circuit breaker is open and rejected the call without trying it
    #[error("Agent store circuit is open")]
    CircuitOpen,

    #[error("Agent store query timed out")]
    Timeout,
}

/// Query access to persisted agents
#[async_trait]
pub trait AgentStorePort: Send + Sync {
    /// Agents matching `query`, ordered by ascending tier and capped at `query.limit`
    async fn query_agents(&self, query: &AgentQuery) -> Result<Vec<Agent>, StoreError>;
}
