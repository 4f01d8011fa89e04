//! Find Candidates use case
//!
//! Three retrieval tiers tried in order: graph-augmented search, a relational
//! query through the (circuit-broken) store, then a narrow emergency query.
//! Each transition is logged and the answering tier is returned as a
//! [`RetrievalOutcome`].

use crate::config::{BehaviorConfig, RetrievalConfig};
use crate::ports::agent_search::{AgentSearchPort, SearchError};
use crate::ports::agent_store::{AgentStorePort, StoreError};
use crate::ports::metrics::{MetricsSink, NoMetrics, OperationRecord, operation};
use panel_domain::{Agent, AgentQuery, RetrievalOutcome, SearchHit, SearchMethod, SearchRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Use case for retrieving candidate agents
pub struct FindCandidatesUseCase<S: AgentSearchPort + 'static, F: AgentStorePort + 'static> {
    search: Arc<S>,
    fallback: Arc<F>,
    emergency: Option<Arc<dyn AgentStorePort>>,
    config: RetrievalConfig,
    behavior: BehaviorConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl<S, F> FindCandidatesUseCase<S, F>
where
    S: AgentSearchPort + 'static,
    F: AgentStorePort + 'static,
{
    /// `fallback` serves the relational tier and, unless
    /// [`with_emergency_store`](Self::with_emergency_store) is set, the emergency tier too.
    pub fn new(search: Arc<S>, fallback: Arc<F>) -> Self {
        Self {
            search,
            fallback,
            emergency: None,
            config: RetrievalConfig::default(),
            behavior: BehaviorConfig::default(),
            metrics: Arc::new(NoMetrics),
        }
    }

    /// Store queried by the emergency tier, typically the store without its circuit breaker
    pub fn with_emergency_store(mut self, store: Arc<dyn AgentStorePort>) -> Self {
        self.emergency = Some(store);
        self
    }

    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve up to `top_k` candidates for `query`, filtered by `domains`.
    ///
    /// Never fails: an outage of every tier yields [`RetrievalOutcome::Empty`].
    pub async fn execute(&self, query: &str, domains: &[String], top_k: usize) -> RetrievalOutcome {
        let started = Instant::now();
        let outcome = self.retrieve(query, domains, top_k).await;

        info!(
            method = %outcome.method(),
            count = outcome.agents().len(),
            "Candidate retrieval completed"
        );
        self.metrics.record(
            OperationRecord::new(operation::AGENT_RETRIEVAL, started.elapsed())
                .with_search_method(outcome.method())
                .with_graph_depth(outcome.graph_depth())
                .with_result_count(outcome.agents().len()),
        );

        outcome
    }

    async fn retrieve(&self, query: &str, domains: &[String], top_k: usize) -> RetrievalOutcome {
        let request = SearchRequest::for_query(query, domains, top_k)
            .with_min_similarity(self.config.min_similarity);

        let primary_error = match self.search_primary(&request).await {
            Ok(hits) => {
                let graph_depth = hits.first().and_then(|hit| hit.metadata.graph_depth);
                debug!(count = hits.len(), ?graph_depth, "GraphRAG search answered");
                return RetrievalOutcome::Primary {
                    agents: hits.into_iter().map(|hit| hit.agent).collect(),
                    graph_depth,
                };
            }
            Err(e) => e,
        };

        warn!(
            event = "graphrag_search_failed",
            error = %primary_error,
            query,
            "GraphRAG search failed, falling back to relational query"
        );

        let fallback = AgentQuery::fallback(domains, top_k);
        let fallback_error = match Self::query_store(&*self.fallback, &fallback, &self.behavior).await {
            Ok(agents) => {
                return RetrievalOutcome::Degraded {
                    agents,
                    method: SearchMethod::RelationalFallback,
                    reason: primary_error.to_string(),
                };
            }
            Err(e) => e,
        };

        error!(
            event = "relational_fallback_failed",
            error = %fallback_error,
            "Relational fallback failed, trying emergency query"
        );

        let emergency = AgentQuery::emergency(self.config.emergency_limit);
        let result = match &self.emergency {
            Some(store) => Self::query_store(store.as_ref(), &emergency, &self.behavior).await,
            None => Self::query_store(&*self.fallback, &emergency, &self.behavior).await,
        };

        match result {
            Ok(agents) => RetrievalOutcome::Degraded {
                agents,
                method: SearchMethod::EmergencyFallback,
                reason: fallback_error.to_string(),
            },
            Err(e) => {
                error!(
                    event = "emergency_fallback_failed",
                    error = %e,
                    "Emergency query failed, no candidates available"
                );
                RetrievalOutcome::Empty {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn search_primary(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.behavior
            .within_deadline(self.search.search(request))
            .await
            .unwrap_or(Err(SearchError::Timeout))
    }

    async fn query_store(
        store: &(dyn AgentStorePort + '_),
        query: &AgentQuery,
        behavior: &BehaviorConfig,
    ) -> Result<Vec<Agent>, StoreError> {
        behavior
            .within_deadline(store.query_agents(query))
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }
}
