//! Agent selection from a ranked candidate list.

use crate::agent::Agent;
use crate::analysis::QueryAnalysis;
use crate::ranking::AgentRanking;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Selection was asked to choose from nothing.
///
/// The one hard failure of the selection pipeline: retrieval always offers
/// at least an emergency candidate, so an empty ranking is a caller error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentSelectionError {
    #[error("Agent selector: no ranked candidates to select from")]
    NoCandidates,
}

/// Outcome of selecting one agent for a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub selected_agent: Agent,
    /// The top ranking's score, unmodified
    pub confidence: f64,
    /// Every non-selected candidate in ranker order
    pub alternate_agents: Vec<AgentRanking>,
    pub reasoning: String,
    pub analysis: QueryAnalysis,
}

impl SelectionResult {
    /// The selected agent followed by up to `limit - 1` alternates.
    pub fn top_agents(&self, limit: usize) -> Vec<&Agent> {
        std::iter::once(&self.selected_agent)
            .chain(self.alternate_agents.iter().map(|r| &r.agent))
            .take(limit)
            .collect()
    }
}

/// Pick the best-ranked agent.
///
/// `rankings` must already be in ranker order; the first entry wins and its
/// score becomes the confidence as-is.
pub fn select_best_agent(
    rankings: &[AgentRanking],
    analysis: &QueryAnalysis,
) -> Result<SelectionResult, AgentSelectionError> {
    let (top, rest) = rankings
        .split_first()
        .ok_or(AgentSelectionError::NoCandidates)?;

    let reasoning = format!(
        "Selected {} because: {} (score {:.2})",
        top.agent.display_name, top.reason, top.score
    );

    Ok(SelectionResult {
        selected_agent: top.agent.clone(),
        confidence: top.score,
        alternate_agents: rest.to_vec(),
        reasoning,
        analysis: analysis.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::ScoreBreakdown;

    fn ranking(id: &str, score: f64) -> AgentRanking {
        AgentRanking {
            agent: Agent::new(id, id, 1),
            score,
            reason: format!("reason for {}", id),
            breakdown: ScoreBreakdown::default(),
        }
    }

    #[test]
    fn test_empty_rankings_fail() {
        let result = select_best_agent(&[], &QueryAnalysis::neutral());
        assert_eq!(result.unwrap_err(), AgentSelectionError::NoCandidates);
    }

    #[test]
    fn test_single_ranking_has_no_alternates() {
        let result = select_best_agent(&[ranking("only", 0.4)], &QueryAnalysis::neutral()).unwrap();
        assert_eq!(result.selected_agent.id, "only");
        assert!(result.alternate_agents.is_empty());
    }

    #[test]
    fn test_confidence_is_top_score() {
        let rankings = vec![ranking("a", 0.95), ranking("b", 0.75)];
        let result = select_best_agent(&rankings, &QueryAnalysis::neutral()).unwrap();

        assert_eq!(result.selected_agent.id, "a");
        assert_eq!(result.confidence, rankings[0].score);
        assert_eq!(result.alternate_agents.len(), 1);
        assert_eq!(result.alternate_agents[0].agent.id, "b");
        assert!(result.reasoning.contains("reason for a"));
        assert!(result.reasoning.contains("0.95"));
    }

    #[test]
    fn test_alternates_keep_order() {
        let rankings = vec![ranking("a", 0.9), ranking("b", 0.8), ranking("c", 0.7)];
        let result = select_best_agent(&rankings, &QueryAnalysis::neutral()).unwrap();
        let ids: Vec<_> = result.alternate_agents.iter().map(|r| r.agent.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_top_agents() {
        let rankings = vec![ranking("a", 0.9), ranking("b", 0.8), ranking("c", 0.7)];
        let result = select_best_agent(&rankings, &QueryAnalysis::neutral()).unwrap();
        let ids: Vec<_> = result.top_agents(2).iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(result.top_agents(10).len(), 3);
    }

    #[test]
    fn test_error_message_names_component() {
        assert!(AgentSelectionError::NoCandidates.to_string().contains("selector"));
    }
}
