//! Retrieval value objects: requests to the search and store collaborators
//! and the typed outcome of the fallback chain.

use crate::agent::{Agent, AgentStatus};
use serde::{Deserialize, Serialize};

/// Default minimum similarity for graph-augmented search hits
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.6;

/// Default number of candidates requested
pub const DEFAULT_TOP_K: usize = 5;

/// Default size of the emergency candidate list
pub const DEFAULT_EMERGENCY_LIMIT: usize = 3;

/// Filters applied by the graph-augmented search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_domain: Option<String>,
    pub status: AgentStatus,
}

/// Request sent to the graph-augmented search collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub min_similarity: f64,
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Build a request for active agents, filtered by the first domain if any.
    pub fn for_query(query: impl Into<String>, domains: &[String], top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            filters: SearchFilters {
                knowledge_domain: domains.first().cloned(),
                status: AgentStatus::Active,
            },
        }
    }

    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }
}

/// Extra context returned with a search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchHitMetadata {
    /// How many graph hops from the seed match this agent was reached at
    pub graph_depth: Option<u32>,
}

/// One hit from the graph-augmented search, ordered by similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub agent: Agent,
    pub similarity: f64,
    #[serde(default)]
    pub metadata: SearchHitMetadata,
}

/// Relational query over the agents collection
///
/// Results are always ordered by ascending tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentQuery {
    pub status: AgentStatus,
    /// Keep only agents whose domain tags overlap these; `None` disables the filter
    pub domains_overlap: Option<Vec<String>>,
    pub limit: usize,
}

impl AgentQuery {
    /// Active agents overlapping `domains` (no filter when empty), best tier first.
    pub fn fallback(domains: &[String], limit: usize) -> Self {
        Self {
            status: AgentStatus::Active,
            domains_overlap: (!domains.is_empty()).then(|| domains.to_vec()),
            limit,
        }
    }

    /// The narrow last-resort query: any active agent, best tier first.
    pub fn emergency(limit: usize) -> Self {
        Self {
            status: AgentStatus::Active,
            domains_overlap: None,
            limit,
        }
    }

    /// Whether an agent satisfies this query's filters (ordering and limit aside).
    pub fn matches(&self, agent: &Agent) -> bool {
        agent.status == self.status
            && self
                .domains_overlap
                .as_ref()
                .is_none_or(|domains| agent.has_any_domain(domains))
    }
}

/// Which retrieval tier produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    GraphragHybrid,
    RelationalFallback,
    EmergencyFallback,
    /// Every tier failed
    None,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::GraphragHybrid => "graphrag_hybrid",
            SearchMethod::RelationalFallback => "relational_fallback",
            SearchMethod::EmergencyFallback => "emergency_fallback",
            SearchMethod::None => "none",
        }
    }
}

impl std::fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed result of the GraphRAG → relational → emergency chain
///
/// Makes "which tier answered" a value instead of a side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// The graph-augmented search answered (possibly with zero hits)
    Primary {
        agents: Vec<Agent>,
        /// Graph depth of the top hit
        graph_depth: Option<u32>,
    },
    /// A fallback tier answered after the tiers above it failed
    Degraded {
        agents: Vec<Agent>,
        method: SearchMethod,
        reason: String,
    },
    /// Every tier failed
    Empty { reason: String },
}

impl RetrievalOutcome {
    pub fn method(&self) -> SearchMethod {
        match self {
            RetrievalOutcome::Primary { .. } => SearchMethod::GraphragHybrid,
            RetrievalOutcome::Degraded { method, .. } => *method,
            RetrievalOutcome::Empty { .. } => SearchMethod::None,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        match self {
            RetrievalOutcome::Primary { agents, .. } | RetrievalOutcome::Degraded { agents, .. } => {
                agents
            }
            RetrievalOutcome::Empty { .. } => &[],
        }
    }

    pub fn into_agents(self) -> Vec<Agent> {
        match self {
            RetrievalOutcome::Primary { agents, .. } | RetrievalOutcome::Degraded { agents, .. } => {
                agents
            }
            RetrievalOutcome::Empty { .. } => Vec::new(),
        }
    }

    /// Whether the primary search was bypassed
    pub fn is_fallback(&self) -> bool {
        !matches!(self, RetrievalOutcome::Primary { .. })
    }

    pub fn graph_depth(&self) -> Option<u32> {
        match self {
            RetrievalOutcome::Primary { graph_depth, .. } => *graph_depth,
            _ => None,
        }
    }
}
