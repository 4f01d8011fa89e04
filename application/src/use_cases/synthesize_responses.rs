//! Synthesize Responses use case
//!
//! Wraps the domain [`ResponseSynthesizer`] with the pipeline's logging and
//! metrics.

use crate::ports::metrics::{MetricsSink, NoMetrics, OperationRecord, operation};
use panel_domain::synthesis::conflict::NO_RESOLUTION;
use panel_domain::{
    AgentResponse, ResponseSynthesizer, StrategyChoice, SynthesisContext, SynthesisError,
    SynthesizedResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Use case for merging several agent responses into one answer
pub struct SynthesizeResponsesUseCase {
    synthesizer: ResponseSynthesizer,
    metrics: Arc<dyn MetricsSink>,
}

impl SynthesizeResponsesUseCase {
    pub fn new(synthesizer: ResponseSynthesizer) -> Self {
        Self {
            synthesizer,
            metrics: Arc::new(NoMetrics),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn synthesizer(&self) -> &ResponseSynthesizer {
        &self.synthesizer
    }

    pub fn execute(
        &self,
        responses: &[AgentResponse],
        context: &SynthesisContext,
        strategy: Option<&str>,
    ) -> Result<SynthesizedResponse, SynthesisError> {
        let started = Instant::now();
        let (result, choice) = self
            .synthesizer
            .synthesize_with_choice(responses, context, strategy)?;

        if choice == StrategyChoice::UnknownRequested {
            warn!(
                requested = strategy.unwrap_or_default(),
                selected = %result.metadata.strategy,
                "Unknown synthesis strategy, selected automatically"
            );
        }
        for conflict in result
            .metadata
            .conflicts
            .iter()
            .filter(|c| c.resolution == NO_RESOLUTION)
        {
            warn!(
                event = "conflict_resolution_unavailable",
                conflict_type = %conflict.conflict_type,
                participants = ?conflict.participants,
                "Conflict left unresolved"
            );
        }

        let duration = started.elapsed();
        info!(
            event = "response_synthesis_completed",
            strategy = %result.metadata.strategy,
            participants = result.metadata.participant_count,
            conflicts = result.metadata.conflict_count,
            quality = result.metadata.quality_score,
            duration_ms = duration.as_millis() as u64,
            "Responses synthesized"
        );
        self.metrics.record(
            OperationRecord::new(operation::RESPONSE_SYNTHESIS, duration)
                .with_confidence(result.confidence)
                .with_result_count(result.metadata.participant_count)
                .with_extra("strategy", result.metadata.strategy.clone())
                .with_extra("conflict_count", result.metadata.conflict_count)
                .with_extra("resolution_count", result.metadata.resolution_count)
                .with_extra("quality_score", result.metadata.quality_score),
        );

        Ok(result)
    }
}

impl Default for SynthesizeResponsesUseCase {
    fn default() -> Self {
        Self::new(ResponseSynthesizer::default())
    }
}
