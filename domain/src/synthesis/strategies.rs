//! Built-in synthesis strategies.
//!
//! Each function merges an already conflict-annotated response set into one
//! answer. They assume a non-empty slice; the synthesizer guarantees it.

use super::response::{AgentResponse, ResponseSource, SynthesisContext};
use super::strategy::StrategyOutput;
use crate::core::text::truncate;
use std::cmp::Ordering;

/// Maximum excerpt length (bytes) kept in a [`ResponseSource`]
pub const EXCERPT_LEN: usize = 200;

fn source(response: &AgentResponse, relevance: f64) -> ResponseSource {
    ResponseSource {
        agent_id: response.agent_id.clone(),
        agent_name: response.agent_name().to_string(),
        excerpt: truncate(response.content.trim(), EXCERPT_LEN),
        confidence: response.effective_confidence(),
        relevance,
    }
}

fn equal_share_sources(responses: &[AgentResponse]) -> Vec<ResponseSource> {
    let share = 1.0 / responses.len().max(1) as f64;
    responses.iter().map(|r| source(r, share)).collect()
}

fn mean_confidence(responses: &[AgentResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    responses.iter().map(AgentResponse::effective_confidence).sum::<f64>() / responses.len() as f64
}

fn percent(value: f64) -> u32 {
    (value * 100.0).round() as u32
}

/// Merge answers in sequence: the first verbatim, each later one introduced with "Additionally:".
///
/// Confidence is the mean of the participants.
pub fn consensus(responses: &[AgentResponse], _context: &SynthesisContext) -> StrategyOutput {
    let mut content = String::new();
    for (i, response) in responses.iter().enumerate() {
        if i > 0 {
            content.push_str("\n\nAdditionally: ");
        }
        content.push_str(response.content.trim());
    }

    StrategyOutput {
        content,
        confidence: mean_confidence(responses),
        sources: equal_share_sources(responses),
    }
}

/// The most confident answer becomes the "Primary Analysis", the others follow as "Specialist Input".
///
/// Confidence is the primary's alone.
pub fn hierarchical(responses: &[AgentResponse], _context: &SynthesisContext) -> StrategyOutput {
    let mut ordered: Vec<&AgentResponse> = responses.iter().collect();
    ordered.sort_by(|a, b| {
        b.effective_confidence()
            .partial_cmp(&a.effective_confidence())
            .unwrap_or(Ordering::Equal)
    });

    let Some((primary, specialists)) = ordered.split_first() else {
        return StrategyOutput {
            content: String::new(),
            confidence: 0.0,
            sources: Vec::new(),
        };
    };

    let mut content = format!(
        "## Primary Analysis ({})\n\n{}",
        primary.agent_name(),
        primary.content.trim()
    );
    if !specialists.is_empty() {
        content.push_str("\n\n## Specialist Input");
        for specialist in specialists {
            content.push_str(&format!(
                "\n\n**{}** ({}% confidence): {}",
                specialist.agent_name(),
                percent(specialist.effective_confidence()),
                specialist.content.trim()
            ));
        }
    }

    let primary_confidence = primary.effective_confidence();
    let sources = ordered
        .iter()
        .map(|r| {
            let relevance = if primary_confidence > 0.0 {
                r.effective_confidence() / primary_confidence
            } else {
                1.0
            };
            source(r, relevance)
        })
        .collect();

    StrategyOutput {
        content,
        confidence: primary_confidence,
        sources,
    }
}

/// Prefix each answer with its share of the total confidence.
///
/// Confidence is the confidence-weighted mean confidence, `Σc² / Σc`, which
/// favours agreement among confident agents over many hesitant ones. With a
/// zero confidence sum every answer gets an equal share and confidence is zero.
pub fn weighted(responses: &[AgentResponse], _context: &SynthesisContext) -> StrategyOutput {
    let total: f64 = responses.iter().map(AgentResponse::effective_confidence).sum();
    let weights: Vec<f64> = if total > 0.0 {
        responses
            .iter()
            .map(|r| r.effective_confidence() / total)
            .collect()
    } else {
        vec![1.0 / responses.len().max(1) as f64; responses.len()]
    };

    let content = responses
        .iter()
        .zip(&weights)
        .map(|(r, w)| format!("[{}% weight] {}: {}", percent(*w), r.agent_name(), r.content.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");

    let confidence = responses
        .iter()
        .zip(&weights)
        .map(|(r, w)| w * r.effective_confidence())
        .sum();

    StrategyOutput {
        content,
        confidence,
        sources: responses
            .iter()
            .zip(&weights)
            .map(|(r, w)| source(r, *w))
            .collect(),
    }
}

/// Chain every answer into one prose paragraph joined by "Building on this analysis,".
///
/// Confidence is the mean of the participants.
pub fn narrative(responses: &[AgentResponse], _context: &SynthesisContext) -> StrategyOutput {
    let content = responses
        .iter()
        .map(|r| r.content.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(" Building on this analysis, ");

    StrategyOutput {
        content,
        confidence: mean_confidence(responses),
        sources: equal_share_sources(responses),
    }
}

/// One `##` section per agent, each closed by a confidence footer.
///
/// Confidence is the mean of the participants.
pub fn structured(responses: &[AgentResponse], context: &SynthesisContext) -> StrategyOutput {
    let mut sections = Vec::with_capacity(responses.len() + 1);
    if let Some(query) = context.query.as_deref().filter(|q| !q.trim().is_empty()) {
        sections.push(format!("**Question:** {}", query.trim()));
    }
    for response in responses {
        sections.push(format!(
            "## {}\n\n{}\n\n_Confidence: {}%_",
            response.agent_name(),
            response.content.trim(),
            percent(response.effective_confidence())
        ));
    }

    StrategyOutput {
        content: sections.join("\n\n"),
        confidence: mean_confidence(responses),
        sources: equal_share_sources(responses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses() -> Vec<AgentResponse> {
        vec![
            AgentResponse::new("cardio", "Check blood pressure daily.", 0.9)
                .with_agent_name("Cardiology Expert"),
            AgentResponse::new("endo", "Monitor glucose levels.", 0.6)
                .with_agent_name("Endocrinology Expert"),
            AgentResponse::new("gp", "See your doctor yearly.", 0.3),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_consensus() {
        let out = consensus(&responses(), &SynthesisContext::default());
        assert!(out.content.starts_with("Check blood pressure daily."));
        assert_eq!(out.content.matches("Additionally: ").count(), 2);
        assert!(close(out.confidence, 0.6));
        assert_eq!(out.sources.len(), 3);
    }

    #[test]
    fn test_hierarchical_leads_with_most_confident() {
        let mut input = responses();
        input.reverse();
        let out = hierarchical(&input, &SynthesisContext::default());

        assert!(out.content.starts_with("## Primary Analysis (Cardiology Expert)"));
        assert!(out.content.contains("## Specialist Input"));
        assert!(out.content.contains("**gp** (30% confidence)"));
        assert!(close(out.confidence, 0.9));
        assert_eq!(out.sources[0].agent_id, "cardio");
        assert!(close(out.sources[0].relevance, 1.0));
    }

    #[test]
    fn test_hierarchical_single_response_has_no_specialists() {
        let out = hierarchical(&responses()[..1], &SynthesisContext::default());
        assert!(!out.content.contains("Specialist Input"));
    }

    #[test]
    fn test_weighted() {
        let out = weighted(&responses(), &SynthesisContext::default());
        // weights 0.5, 0.333.., 0.166..
        assert!(out.content.starts_with("[50% weight] Cardiology Expert:"));
        assert!(out.content.contains("[33% weight] Endocrinology Expert:"));
        assert!(out.content.contains("[17% weight] gp:"));
        // (0.81 + 0.36 + 0.09) / 1.8
        assert!(close(out.confidence, 0.7));
        let total: f64 = out.sources.iter().map(|s| s.relevance).sum();
        assert!(close(total, 1.0));
    }

    #[test]
    fn test_weighted_zero_confidence() {
        let input = vec![
            AgentResponse::new("a", "x", 0.0),
            AgentResponse::new("b", "y", 0.0),
        ];
        let out = weighted(&input, &SynthesisContext::default());
        assert_eq!(out.confidence, 0.0);
        assert!(out.content.contains("[50% weight] a: x"));
    }

    #[test]
    fn test_narrative_is_one_paragraph() {
        let input = vec![
            AgentResponse::new("a", "First line.\n\nSecond line.", 0.8),
            AgentResponse::new("b", "Another view.", 0.4),
        ];
        let out = narrative(&input, &SynthesisContext::default());
        assert_eq!(
            out.content,
            "First line. Second line. Building on this analysis, Another view."
        );
        assert!(!out.content.contains('\n'));
        assert!(close(out.confidence, 0.6));
    }

    #[test]
    fn test_structured_sections_and_footers() {
        let out = structured(&responses(), &SynthesisContext::default());
        let headings = out.content.lines().filter(|l| l.starts_with("## ")).count();
        assert_eq!(headings, 3);
        assert_eq!(out.content.matches("_Confidence: ").count(), 3);
        assert!(out.content.contains("## Cardiology Expert"));
        assert!(out.content.contains("_Confidence: 90%_"));
    }

    #[test]
    fn test_structured_includes_question_when_known() {
        let out = structured(&responses(), &SynthesisContext::for_query("Why?"));
        assert!(out.content.starts_with("**Question:** Why?"));
    }

    #[test]
    fn test_excerpts_are_truncated() {
        let long = "word ".repeat(100);
        let out = consensus(
            &[AgentResponse::new("a", long.clone(), 0.5), AgentResponse::new("b", long, 0.5)],
            &SynthesisContext::default(),
        );
        assert!(out.sources[0].excerpt.len() <= EXCERPT_LEN);
        assert!(out.sources[0].excerpt.ends_with("..."));
    }
}
