//! Response synthesizer: merges several agent responses into one answer.

use super::conflict::{annotate_responses, detect_conflicts, resolve_conflicts};
use super::quality::quality_score;
use super::response::{AgentResponse, SynthesisContext, SynthesisMetadata, SynthesizedResponse};
use super::strategy::{StrategyRegistry, StrategyScoring, SynthesisStrategy};
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// Caller errors raised by the synthesizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("Response synthesizer: no valid responses to synthesize")]
    NoValidResponses,

    #[error("Response synthesizer: no compatible strategy for {response_count} responses")]
    NoCompatibleStrategy { response_count: usize },
}

/// How the strategy for a run was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyChoice {
    /// The caller named a registered strategy
    Requested,
    /// Chosen by window and scoring heuristics
    Automatic,
    /// The caller named a strategy that is not registered
    UnknownRequested,
}

/// Merges agent responses using a registry of strategies
#[derive(Debug, Clone, Default)]
pub struct ResponseSynthesizer {
    registry: StrategyRegistry,
    scoring: StrategyScoring,
}

impl ResponseSynthesizer {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self {
            registry,
            scoring: StrategyScoring::default(),
        }
    }

    pub fn with_scoring(mut self, scoring: StrategyScoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Pick the strategy for `count` responses.
    ///
    /// A registered `requested` name wins outright. Anything else falls back
    /// to automatic selection.
    pub fn resolve_strategy(
        &self,
        requested: Option<&str>,
        count: usize,
        context: &SynthesisContext,
    ) -> Result<(&SynthesisStrategy, StrategyChoice), SynthesisError> {
        let mut choice = StrategyChoice::Automatic;
        if let Some(name) = requested {
            if let Some(strategy) = self.registry.get(name) {
                return Ok((strategy, StrategyChoice::Requested));
            }
            choice = StrategyChoice::UnknownRequested;
        }

        self.registry
            .select(count, &context.user_preferences, &self.scoring)
            .map(|strategy| (strategy, choice))
            .ok_or(SynthesisError::NoCompatibleStrategy {
                response_count: count,
            })
    }

    /// Synthesize `responses` into one answer.
    ///
    /// Blank responses are dropped first. Conflicts are detected and resolved
    /// on the remainder, and resolution notes are appended to the affected
    /// responses before the strategy runs.
    pub fn synthesize(
        &self,
        responses: &[AgentResponse],
        context: &SynthesisContext,
        strategy_name: Option<&str>,
    ) -> Result<SynthesizedResponse, SynthesisError> {
        self.synthesize_with_choice(responses, context, strategy_name)
            .map(|(response, _)| response)
    }

    /// Like [`synthesize`](Self::synthesize), also reporting how the strategy was chosen.
    pub fn synthesize_with_choice(
        &self,
        responses: &[AgentResponse],
        context: &SynthesisContext,
        strategy_name: Option<&str>,
    ) -> Result<(SynthesizedResponse, StrategyChoice), SynthesisError> {
        let started = Instant::now();

        let valid: Vec<AgentResponse> = responses.iter().filter(|r| !r.is_blank()).cloned().collect();
        if valid.is_empty() {
            return Err(SynthesisError::NoValidResponses);
        }

        let (strategy, choice) = self.resolve_strategy(strategy_name, valid.len(), context)?;

        let mut conflicts = detect_conflicts(&valid);
        resolve_conflicts(&mut conflicts, &valid);
        let resolved = conflicts.iter().filter(|c| c.is_resolved()).count();
        let annotated = annotate_responses(valid, &conflicts);

        let output = (strategy.run)(&annotated, context);
        let confidence = if output.confidence.is_finite() {
            output.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let metadata = SynthesisMetadata {
            strategy: strategy.name.to_string(),
            participant_count: annotated.len(),
            conflict_count: conflicts.len(),
            resolution_count: resolved,
            quality_score: quality_score(confidence, conflicts.len(), resolved, annotated.len()),
            processing_time_ms: started.elapsed().as_millis() as u64,
            conflicts,
        };

        Ok((
            SynthesizedResponse {
                id: Uuid::new_v4(),
                content: output.content,
                confidence,
                sources: output.sources,
                metadata,
            },
            choice,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::conflict::ConflictSeverity;
    use crate::synthesis::response::{DetailLevel, ResponseFormat};

    fn three_responses() -> Vec<AgentResponse> {
        vec![
            AgentResponse::new("cardio", "Blood pressure targets matter.", 0.9)
                .with_agent_name("Cardiology Expert"),
            AgentResponse::new("endo", "Glucose control matters.", 0.7)
                .with_agent_name("Endocrinology Expert"),
            AgentResponse::new("gp", "Regular checkups help.", 0.6).with_agent_name("GP"),
        ]
    }

    #[test]
    fn test_empty_responses_rejected() {
        let synthesizer = ResponseSynthesizer::default();
        let err = synthesizer
            .synthesize(&[], &SynthesisContext::default(), None)
            .unwrap_err();
        assert_eq!(err, SynthesisError::NoValidResponses);
    }

    #[test]
    fn test_blank_responses_rejected() {
        let synthesizer = ResponseSynthesizer::default();
        let blank = vec![
            AgentResponse::new("a", "   ", 0.9),
            AgentResponse::new("b", "\n\t", 0.4),
        ];
        let err = synthesizer
            .synthesize(&blank, &SynthesisContext::default(), None)
            .unwrap_err();
        assert_eq!(err, SynthesisError::NoValidResponses);
    }

    #[test]
    fn test_structured_preference_selects_structured() {
        let synthesizer = ResponseSynthesizer::default();
        let context = SynthesisContext::default().with_format(ResponseFormat::Structured);
        let result = synthesizer
            .synthesize(&three_responses(), &context, None)
            .unwrap();

        assert_eq!(result.metadata.strategy, "structured");
        let sections = result.content.lines().filter(|l| l.starts_with("## ")).count();
        assert_eq!(sections, 3);
        assert_eq!(result.content.matches("_Confidence: ").count(), 3);
        assert_eq!(result.sources.len(), 3);
    }

    #[test]
    fn test_comprehensive_detail_prefers_weighted() {
        let synthesizer = ResponseSynthesizer::default();
        let responses: Vec<_> = (0..7)
            .map(|i| AgentResponse::new(format!("agent-{i}"), format!("Point {i}."), 0.7))
            .collect();
        let context = SynthesisContext::default().with_detail_level(DetailLevel::Comprehensive);
        let result = synthesizer.synthesize(&responses, &context, None).unwrap();
        assert_eq!(result.metadata.strategy, "weighted");
    }

    #[test]
    fn test_named_strategy_is_used() {
        let synthesizer = ResponseSynthesizer::default();
        let (result, choice) = synthesizer
            .synthesize_with_choice(
                &three_responses(),
                &SynthesisContext::default(),
                Some("hierarchical"),
            )
            .unwrap();
        assert_eq!(choice, StrategyChoice::Requested);
        assert_eq!(result.metadata.strategy, "hierarchical");
        assert!(result.content.starts_with("## Primary Analysis (Cardiology Expert)"));
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_strategy_falls_back_to_automatic() {
        let synthesizer = ResponseSynthesizer::default();
        let (result, choice) = synthesizer
            .synthesize_with_choice(&three_responses(), &SynthesisContext::default(), Some("poetry"))
            .unwrap();
        assert_eq!(choice, StrategyChoice::UnknownRequested);
        assert!(synthesizer.registry().get(&result.metadata.strategy).is_some());
    }

    #[test]
    fn test_no_compatible_strategy() {
        let synthesizer = ResponseSynthesizer::default();
        let responses: Vec<_> = (0..13)
            .map(|i| AgentResponse::new(format!("agent-{i}"), "text", 0.5))
            .collect();
        let err = synthesizer
            .synthesize(&responses, &SynthesisContext::default(), None)
            .unwrap_err();
        assert_eq!(err, SynthesisError::NoCompatibleStrategy { response_count: 13 });
    }

    #[test]
    fn test_contradiction_is_resolved_and_annotated() {
        let synthesizer = ResponseSynthesizer::default();
        let responses = vec![
            AgentResponse::new("pharm", "This treatment is safe", 0.9)
                .with_agent_name("Pharmacology Expert"),
            AgentResponse::new("gp", "This treatment is unsafe", 0.7).with_agent_name("GP"),
        ];
        let result = synthesizer
            .synthesize(&responses, &SynthesisContext::default(), Some("consensus"))
            .unwrap();

        assert_eq!(result.metadata.conflict_count, 1);
        assert_eq!(result.metadata.resolution_count, 1);
        let conflict = &result.metadata.conflicts[0];
        assert_eq!(conflict.severity, ConflictSeverity::High);
        assert!(result.content.contains("[Resolution: Deferring to Pharmacology Expert"));
    }

    #[test]
    fn test_quality_score_in_bounds() {
        let synthesizer = ResponseSynthesizer::default();
        let mut responses = three_responses();
        responses.push(AgentResponse::new("x", "The result is negative, no", 0.1));
        responses.push(AgentResponse::new("y", "The result is positive, yes", 1.0));
        for name in ["consensus", "hierarchical", "weighted", "narrative", "structured"] {
            let result = synthesizer
                .synthesize(&responses, &SynthesisContext::default(), Some(name))
                .unwrap();
            assert!((0.0..=1.0).contains(&result.metadata.quality_score));
            assert!(result.metadata.conflict_count > 0);
        }
    }

    #[test]
    fn test_blank_responses_filtered_before_counting() {
        let synthesizer = ResponseSynthesizer::default();
        let mut responses = three_responses();
        responses.push(AgentResponse::new("empty", "", 0.9));
        let result = synthesizer
            .synthesize(&responses, &SynthesisContext::default(), None)
            .unwrap();
        assert_eq!(result.metadata.participant_count, 3);
        assert!(result.sources.iter().all(|s| s.agent_id != "empty"));
    }
}
