//! Analyze Query use case
//!
//! Asks the analyzer model to classify a question. Fails open: any gateway,
//! timeout or parse failure yields [`QueryAnalysis::neutral`].

use crate::config::BehaviorConfig;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::metrics::{MetricsSink, NoMetrics, OperationRecord, operation};
use panel_domain::{AnalysisParseError, Model, PromptTemplate, QueryAnalysis, parse_analysis_response};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error};

/// Why an analysis attempt fell back to the neutral result
#[derive(Error, Debug)]
pub enum AnalyzeQueryError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Unparsable analysis: {0}")]
    Parse(#[from] AnalysisParseError),
}

/// Use case for turning a free-text question into a [`QueryAnalysis`]
pub struct AnalyzeQueryUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    model: Model,
    behavior: BehaviorConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl<G: LlmGateway + 'static> AnalyzeQueryUseCase<G> {
    pub fn new(gateway: Arc<G>, model: Model) -> Self {
        Self {
            gateway,
            model,
            behavior: BehaviorConfig::default(),
            metrics: Arc::new(NoMetrics),
        }
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Analyze `query`, never failing.
    pub async fn execute(&self, query: &str) -> QueryAnalysis {
        let started = Instant::now();

        let (analysis, fell_back) = match self.try_analyze(query).await {
            Ok(analysis) => {
                debug!(
                    intent = %analysis.intent,
                    domains = ?analysis.domains,
                    confidence = analysis.confidence,
                    "Query analyzed"
                );
                (analysis, false)
            }
            Err(e) => {
                error!(
                    event = "query_analysis_failed",
                    error = %e,
                    model = %self.model,
                    "Query analysis failed, using neutral analysis"
                );
                (QueryAnalysis::neutral(), true)
            }
        };

        self.metrics.record(
            OperationRecord::new(operation::QUERY_ANALYSIS, started.elapsed())
                .with_confidence(analysis.confidence)
                .with_extra("fallback", fell_back)
                .with_extra("domain_count", analysis.domains.len()),
        );

        analysis
    }

    async fn try_analyze(&self, query: &str) -> Result<QueryAnalysis, AnalyzeQueryError> {
        let call = async {
            let session = self
                .gateway
                .create_session_with_system_prompt(&self.model, PromptTemplate::analysis_system())
                .await?;
            session.send(&PromptTemplate::analysis_query(query)).await
        };

        let content = self
            .behavior
            .within_deadline(call)
            .await
            .unwrap_or(Err(GatewayError::Timeout))?;

        Ok(parse_analysis_response(&content)?)
    }
}
