//! Port for structured operation metrics.
//!
//! Defines the [`MetricsSink`] trait for recording one [`OperationRecord`]
//! per pipeline operation (retrieval, ranking, selection, synthesis).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures machine-readable
//! records for tuning the heuristics.

use panel_domain::SearchMethod;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Operation types recorded by the pipeline
pub mod operation {
    pub const QUERY_ANALYSIS: &str = "query_analysis";
    pub const AGENT_RETRIEVAL: &str = "agent_retrieval";
    pub const AGENT_RANKING: &str = "agent_ranking";
    pub const AGENT_SELECTION: &str = "agent_selection";
    pub const RESPONSE_SYNTHESIS: &str = "response_synthesis";
}

/// One structured metrics record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    pub operation_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_method: Option<SearchMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphrag_hit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphrag_fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_traversal_depth: Option<u32>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<usize>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl OperationRecord {
    pub fn new(operation_type: &'static str, latency: Duration) -> Self {
        Self {
            operation_type,
            search_method: None,
            graphrag_hit: None,
            graphrag_fallback: None,
            graph_traversal_depth: None,
            latency_ms: latency.as_millis() as u64,
            confidence: None,
            agent_id: None,
            result_count: None,
            extra: Map::new(),
        }
    }

    /// Record which retrieval tier answered and derive the GraphRAG flags from it.
    pub fn with_search_method(mut self, method: SearchMethod) -> Self {
        let primary = method == SearchMethod::GraphragHybrid;
        self.search_method = Some(method);
        self.graphrag_hit = Some(primary);
        self.graphrag_fallback = Some(!primary);
        self
    }

    pub fn with_graph_depth(mut self, depth: Option<u32>) -> Self {
        self.graph_traversal_depth = depth;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = Some(count);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Port for recording operation metrics.
///
/// `record` is synchronous and infallible: sink failures must never reach
/// the pipeline, so implementations swallow their own errors.
pub trait MetricsSink: Send + Sync {
    fn record(&self, record: OperationRecord);
}

/// No-op implementation for tests and when metrics are disabled.
pub struct NoMetrics;

impl MetricsSink for NoMetrics {
    fn record(&self, _record: OperationRecord) {}
}
