//! Agent ranking.
//!
//! Scores candidate agents against a query and its analysis with a fixed
//! weighted-feature model. Every function here is pure and total: empty input
//! gives empty output, and agents without capabilities or domains simply
//! score zero on those features.

use super::weights::RankingWeights;
use crate::agent::Agent;
use crate::analysis::QueryAnalysis;
use crate::core::text::{coverage, tags_match, terms};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Domain relevance given when no analysis domain is known but an agent
/// domain tag appears in the query text itself.
const QUERY_MENTION_RELEVANCE: f64 = 0.5;

/// Per-feature sub-scores, each in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub semantic_similarity: f64,
    pub domain_relevance: f64,
    pub tier_preference: f64,
    pub capability_match: f64,
}

impl ScoreBreakdown {
    /// Weighted combination, normalised by the weight sum and clamped to `0.0..=1.0`.
    pub fn combine(&self, weights: &RankingWeights) -> f64 {
        let total = weights.total();
        if total <= 0.0 || !total.is_finite() {
            return 0.0;
        }
        let raw = self.semantic_similarity * weights.semantic_similarity
            + self.domain_relevance * weights.domain_relevance
            + self.tier_preference * weights.tier_preference
            + self.capability_match * weights.capability_match;
        (raw / total).clamp(0.0, 1.0)
    }
}

/// An agent paired with its score, explanation and sub-scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRanking {
    pub agent: Agent,
    pub score: f64,
    /// Human-readable explanation naming the dominant factor
    pub reason: String,
    pub breakdown: ScoreBreakdown,
}

/// Which feature contributed most to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Factor {
    Semantic,
    Domain,
    Tier,
    Capability,
}

/// Rank `agents` for `query` using the default weights.
pub fn rank_agents(agents: &[Agent], query: &str, analysis: &QueryAnalysis) -> Vec<AgentRanking> {
    rank_agents_with_weights(agents, query, analysis, &RankingWeights::default())
}

/// Rank `agents` for `query` using explicit weights.
///
/// The result is sorted by descending score; equal scores put the lower tier first.
pub fn rank_agents_with_weights(
    agents: &[Agent],
    query: &str,
    analysis: &QueryAnalysis,
    weights: &RankingWeights,
) -> Vec<AgentRanking> {
    let query_terms: Vec<String> = terms(query).into_iter().collect();

    let mut rankings: Vec<AgentRanking> = agents
        .iter()
        .map(|agent| rank_one(agent, query, &query_terms, analysis, weights))
        .collect();

    rankings.sort_by(compare_rankings);
    rankings
}

/// Descending score, then ascending tier.
fn compare_rankings(a: &AgentRanking, b: &AgentRanking) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.agent.tier.cmp(&b.agent.tier))
}

fn rank_one(
    agent: &Agent,
    query: &str,
    query_terms: &[String],
    analysis: &QueryAnalysis,
    weights: &RankingWeights,
) -> AgentRanking {
    let (domain_relevance, matched_domain) = domain_relevance(agent, query, analysis);
    let (capability_match, matched_capability) = capability_match(agent, analysis);

    let breakdown = ScoreBreakdown {
        semantic_similarity: semantic_similarity(agent, query_terms),
        domain_relevance,
        tier_preference: tier_preference(agent),
        capability_match,
    };
    let score = breakdown.combine(weights);
    let reason = explain(
        agent,
        &breakdown,
        weights,
        matched_domain.as_deref(),
        matched_capability.as_deref(),
    );

    AgentRanking {
        agent: agent.clone(),
        score,
        reason,
        breakdown,
    }
}

/// Share of the query's terms that also appear in the agent's name, display
/// name or description. Lexical only; no embeddings.
fn semantic_similarity(agent: &Agent, query_terms: &[String]) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let profile = terms(&format!(
        "{} {} {}",
        agent.name.replace(['-', '_'], " "),
        agent.display_name,
        agent.description
    ));
    coverage(query_terms, &profile)
}

/// Share of analysis domains covered by the agent's knowledge-domain tags.
///
/// Without analysis domains, an agent domain mentioned in the query text still
/// earns partial relevance.
fn domain_relevance(agent: &Agent, query: &str, analysis: &QueryAnalysis) -> (f64, Option<String>) {
    if agent.knowledge_domains.is_empty() {
        return (0.0, None);
    }

    if analysis.domains.is_empty() {
        let query_lower = query.to_lowercase();
        let mentioned = agent
            .knowledge_domains
            .iter()
            .find(|d| !d.trim().is_empty() && query_lower.contains(&d.trim().to_lowercase()));
        return match mentioned {
            Some(d) => (QUERY_MENTION_RELEVANCE, Some(d.clone())),
            None => (0.0, None),
        };
    }

    let mut first_match = None;
    let matched = analysis
        .domains
        .iter()
        .filter(|wanted| {
            let hit = agent.knowledge_domains.iter().find(|own| tags_match(own, wanted));
            if first_match.is_none() {
                first_match = hit.cloned();
            }
            hit.is_some()
        })
        .count();

    (matched as f64 / analysis.domains.len() as f64, first_match)
}

/// `1 / tier`: tier 1 scores 1.0, tier 2 scores 0.5, and so on.
fn tier_preference(agent: &Agent) -> f64 {
    1.0 / f64::from(agent.effective_tier())
}

/// Share of capabilities that meet the analysis intent or keywords, measured
/// against the smaller of the two lists so a narrow query can still fully match.
fn capability_match(agent: &Agent, analysis: &QueryAnalysis) -> (f64, Option<String>) {
    let wanted = analysis.match_terms();
    if agent.capabilities.is_empty() || wanted.is_empty() {
        return (0.0, None);
    }

    let matched: Vec<&String> = agent
        .capabilities
        .iter()
        .filter(|cap| wanted.iter().any(|w| tags_match(cap, w)))
        .collect();

    let denominator = agent.capabilities.len().min(wanted.len());
    let score = (matched.len() as f64 / denominator as f64).min(1.0);
    (score, matched.first().map(|c| (*c).clone()))
}

fn explain(
    agent: &Agent,
    breakdown: &ScoreBreakdown,
    weights: &RankingWeights,
    matched_domain: Option<&str>,
    matched_capability: Option<&str>,
) -> String {
    let contributions = [
        (Factor::Domain, breakdown.domain_relevance * weights.domain_relevance),
        (Factor::Capability, breakdown.capability_match * weights.capability_match),
        (Factor::Semantic, breakdown.semantic_similarity * weights.semantic_similarity),
        (Factor::Tier, breakdown.tier_preference * weights.tier_preference),
    ];

    // First maximum wins, so ties favour domain over capability over text over tier.
    let mut dominant = contributions[0];
    for candidate in &contributions[1..] {
        if candidate.1 > dominant.1 {
            dominant = *candidate;
        }
    }

    if dominant.1 <= 0.0 {
        return "General availability; no specific match".to_string();
    }

    match dominant.0 {
        Factor::Domain => format!(
            "Strong {} domain match",
            matched_domain.unwrap_or("knowledge")
        ),
        Factor::Capability => format!(
            "Capability match: {}",
            matched_capability.unwrap_or("requested task")
        ),
        Factor::Semantic => format!("Profile of {} closely matches the query", agent.display_name),
        Factor::Tier => format!("Preferred tier {} specialist", agent.tier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cardiology_expert() -> Agent {
        Agent::new("cardio", "cardiology-expert", 1)
            .with_display_name("Cardiology Expert")
            .with_description("Specialist in heart disease and cardiac symptoms")
            .with_capabilities(["diagnosis", "treatment"])
            .with_domains(["cardiology"])
    }

    fn general_practitioner() -> Agent {
        Agent::new("gp", "general-practitioner", 3)
            .with_display_name("General Practitioner")
            .with_description("Primary care for everyday health questions")
            .with_domains(["general"])
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(rank_agents(&[], "anything", &QueryAnalysis::neutral()).is_empty());
    }

    #[test]
    fn test_cardiology_expert_ranks_first() {
        let analysis = QueryAnalysis::neutral().with_domains(["cardiology"]);
        let agents = vec![general_practitioner(), cardiology_expert()];

        let rankings = rank_agents(&agents, "cardiac symptoms", &analysis);

        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].agent.id, "cardio");
        assert!(rankings[0].breakdown.domain_relevance > 0.5);
        assert!(rankings[0].reason.contains("cardiology"));
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let analysis = QueryAnalysis::neutral()
            .with_intent("diagnosis")
            .with_domains(["cardiology"]);
        let agents = vec![cardiology_expert(), general_practitioner()];

        let first = rank_agents(&agents, "chest pain diagnosis", &analysis);
        let second = rank_agents(&agents, "chest pain diagnosis", &analysis);

        assert_eq!(first, second);
    }

    #[test]
    fn test_agents_without_tags_score_in_range() {
        let bare = Agent::new("bare", "bare", 2);
        let analysis = QueryAnalysis::neutral()
            .with_intent("diagnosis")
            .with_domains(["oncology"])
            .with_keywords(["tumor"]);

        let rankings = rank_agents(&[bare], "tumor markers", &analysis);

        assert_eq!(rankings.len(), 1);
        let r = &rankings[0];
        assert_eq!(r.breakdown.domain_relevance, 0.0);
        assert_eq!(r.breakdown.capability_match, 0.0);
        assert!((0.0..=1.0).contains(&r.score));
    }

    #[test]
    fn test_sorted_descending_with_tier_tie_break() {
        // Identical profiles apart from tier: the tier score differs, so use
        // zero tier weight to force an exact score tie.
        let weights = RankingWeights {
            tier_preference: 0.0,
            ..RankingWeights::default()
        };
        let agents = vec![
            Agent::new("t3", "t3", 3).with_domains(["neurology"]),
            Agent::new("t1", "t1", 1).with_domains(["neurology"]),
            Agent::new("t2", "t2", 2).with_domains(["dermatology"]),
        ];
        let analysis = QueryAnalysis::neutral().with_domains(["neurology"]);

        let rankings = rank_agents_with_weights(&agents, "headache", &analysis, &weights);

        assert_eq!(rankings[0].agent.id, "t1");
        assert_eq!(rankings[1].agent.id, "t3");
        assert_eq!(rankings[2].agent.id, "t2");
        for pair in rankings.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].agent.tier <= pair[1].agent.tier);
            }
        }
    }

    #[test]
    fn test_tier_preference_decreases() {
        let analysis = QueryAnalysis::neutral();
        let rankings = rank_agents(
            &[Agent::new("a", "a", 1), Agent::new("b", "b", 2), Agent::new("c", "c", 4)],
            "",
            &analysis,
        );
        let tiers: Vec<f64> = rankings.iter().map(|r| r.breakdown.tier_preference).collect();
        assert_eq!(tiers, vec![1.0, 0.5, 0.25]);
        assert!(rankings[0].reason.contains("tier 1"));
    }

    #[test]
    fn test_capability_match_uses_intent_and_keywords() {
        let analysis = QueryAnalysis::neutral()
            .with_intent("treatment")
            .with_keywords(["dosage"]);
        let agent = Agent::new("pharm", "pharmacist", 2).with_capabilities(["dosage", "interactions"]);

        let rankings = rank_agents(&[agent], "how much ibuprofen", &analysis);

        assert_eq!(rankings[0].breakdown.capability_match, 0.5);
        assert!(rankings[0].reason.contains("dosage"));
    }

    #[test]
    fn test_domain_mentioned_in_query_without_analysis_domains() {
        let agent = Agent::new("derm", "dermatologist", 2).with_domains(["dermatology"]);
        let rankings = rank_agents(&[agent], "Is this a dermatology issue?", &QueryAnalysis::neutral());
        assert_eq!(rankings[0].breakdown.domain_relevance, 0.5);
    }

    #[test]
    fn test_semantic_similarity_is_lexical() {
        let agent = cardiology_expert();
        let rankings = rank_agents(&[agent], "cardiac symptoms", &QueryAnalysis::neutral());
        assert_eq!(rankings[0].breakdown.semantic_similarity, 1.0);

        let rankings = rank_agents(&[general_practitioner()], "cardiac symptoms", &QueryAnalysis::neutral());
        assert_eq!(rankings[0].breakdown.semantic_similarity, 0.0);
    }

    #[test]
    fn test_scores_always_in_unit_interval() {
        let heavy = RankingWeights {
            semantic_similarity: 5.0,
            domain_relevance: 5.0,
            tier_preference: 5.0,
            capability_match: 5.0,
        };
        let analysis = QueryAnalysis::neutral()
            .with_intent("diagnosis")
            .with_domains(["cardiology"]);
        for r in rank_agents_with_weights(&[cardiology_expert()], "cardiac diagnosis", &analysis, &heavy) {
            assert!((0.0..=1.0).contains(&r.score));
        }
    }
}
