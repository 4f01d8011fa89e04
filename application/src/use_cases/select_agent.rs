//! Select Agent use case
//!
//! Runs the selection pipeline strictly in sequence:
//! Analyze → Retrieve → Rank → Select.

use crate::ports::agent_search::AgentSearchPort;
use crate::ports::agent_store::AgentStorePort;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::metrics::{MetricsSink, NoMetrics, OperationRecord, operation};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::analyze_query::AnalyzeQueryUseCase;
use crate::use_cases::find_candidates::FindCandidatesUseCase;
use panel_domain::{
    AgentSelectionError, DomainError, Phase, RankingWeights, RetrievalOutcome, SearchMethod,
    SelectionResult, rank_agents_with_weights, select_best_agent, validate_query,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Errors that end a selection run
#[derive(Error, Debug)]
pub enum SelectAgentError {
    #[error(transparent)]
    InvalidQuery(#[from] DomainError),

    #[error(transparent)]
    Selection(#[from] AgentSelectionError),
}

/// A selection together with how its candidates were found
#[derive(Debug, Clone, Serialize)]
pub struct AgentSelection {
    pub selection: SelectionResult,
    pub search_method: SearchMethod,
    /// Why the primary search was bypassed, if it was
    pub fallback_reason: Option<String>,
    pub candidate_count: usize,
}

/// Use case for choosing the single best agent for a question
pub struct SelectAgentUseCase<G, S, F>
where
    G: LlmGateway + 'static,
    S: AgentSearchPort + 'static,
    F: AgentStorePort + 'static,
{
    analyzer: AnalyzeQueryUseCase<G>,
    retriever: FindCandidatesUseCase<S, F>,
    weights: RankingWeights,
    metrics: Arc<dyn MetricsSink>,
}

impl<G, S, F> SelectAgentUseCase<G, S, F>
where
    G: LlmGateway + 'static,
    S: AgentSearchPort + 'static,
    F: AgentStorePort + 'static,
{
    pub fn new(analyzer: AnalyzeQueryUseCase<G>, retriever: FindCandidatesUseCase<S, F>) -> Self {
        Self {
            analyzer,
            retriever,
            weights: RankingWeights::default(),
            metrics: Arc::new(NoMetrics),
        }
    }

    pub fn with_weights(mut self, weights: RankingWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, query: &str) -> Result<AgentSelection, SelectAgentError> {
        self.execute_with_progress(query, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        query: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<AgentSelection, SelectAgentError> {
        let query = validate_query(query)?;

        // Phase 1: Analyze
        progress.on_phase_start(&Phase::Analyze, 1);
        let analysis = self.analyzer.execute(query).await;
        progress.on_task_complete(&Phase::Analyze, &analysis.intent, true);
        progress.on_phase_complete(&Phase::Analyze);

        // Phase 2: Retrieve
        progress.on_phase_start(&Phase::Retrieve, 1);
        let top_k = self.retriever.config().top_k;
        let outcome = self.retriever.execute(query, &analysis.domains, top_k).await;
        let search_method = outcome.method();
        progress.on_task_complete(
            &Phase::Retrieve,
            search_method.as_str(),
            !matches!(outcome, RetrievalOutcome::Empty { .. }),
        );
        progress.on_phase_complete(&Phase::Retrieve);

        let fallback_reason = match &outcome {
            RetrievalOutcome::Primary { .. } => None,
            RetrievalOutcome::Degraded { reason, .. } | RetrievalOutcome::Empty { reason } => {
                Some(reason.clone())
            }
        };
        let candidates = outcome.into_agents();
        let candidate_count = candidates.len();

        // Phase 3: Rank
        progress.on_phase_start(&Phase::Rank, candidate_count);
        info!(event = "agent_ranking_started", candidates = candidate_count, "Ranking candidates");
        let started = Instant::now();
        let rankings = rank_agents_with_weights(&candidates, query, &analysis, &self.weights);

        let mut record = OperationRecord::new(operation::AGENT_RANKING, started.elapsed())
            .with_result_count(rankings.len());
        if let Some(top) = rankings.first() {
            record = record.with_agent_id(&top.agent.id).with_confidence(top.score);
        }
        self.metrics.record(record);
        for ranking in &rankings {
            progress.on_task_complete(&Phase::Rank, &ranking.agent.display_name, true);
        }
        progress.on_phase_complete(&Phase::Rank);

        // Phase 4: Select
        progress.on_phase_start(&Phase::Select, 1);
        let started = Instant::now();
        let selection = match select_best_agent(&rankings, &analysis) {
            Ok(selection) => selection,
            Err(e) => {
                progress.on_task_complete(&Phase::Select, "none", false);
                progress.on_phase_complete(&Phase::Select);
                return Err(e.into());
            }
        };

        info!(
            event = "agent_selection_completed",
            agent_id = %selection.selected_agent.id,
            confidence = selection.confidence,
            alternates = selection.alternate_agents.len(),
            "Agent selected"
        );
        self.metrics.record(
            OperationRecord::new(operation::AGENT_SELECTION, started.elapsed())
                .with_search_method(search_method)
                .with_agent_id(&selection.selected_agent.id)
                .with_confidence(selection.confidence)
                .with_result_count(candidate_count),
        );
        progress.on_task_complete(&Phase::Select, &selection.selected_agent.display_name, true);
        progress.on_phase_complete(&Phase::Select);

        Ok(AgentSelection {
            selection,
            search_method,
            fallback_reason,
            candidate_count,
        })
    }
}
