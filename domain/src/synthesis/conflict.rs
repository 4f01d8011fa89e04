//! Conflict detection and resolution between agent responses.
//!
//! Detection is a pairwise keyword heuristic: opposing words from a fixed
//! antonym list make a contradiction, and widely differing confidences make an
//! inconsistency. Negated phrasings such as "not unsafe" are not understood.
//! Resolution defers to the more confident participant and records that
//! decision as a visible note on both responses.

use super::response::AgentResponse;
use crate::core::text::words;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opposing word pairs that flag a contradiction when split across two responses
pub const ANTONYM_PAIRS: &[(&str, &str)] = &[
    ("yes", "no"),
    ("true", "false"),
    ("safe", "unsafe"),
    ("effective", "ineffective"),
    ("approved", "rejected"),
    ("recommended", "discouraged"),
    ("indicated", "contraindicated"),
    ("benign", "malignant"),
    ("increase", "decrease"),
    ("positive", "negative"),
];

/// Confidence gap above which two responses are considered inconsistent
pub const INCONSISTENCY_THRESHOLD: f64 = 0.5;

/// Confidence assigned to a detected contradiction
pub const CONTRADICTION_CONFIDENCE: f64 = 0.8;

/// Confidence assigned to a detected inconsistency
pub const INCONSISTENCY_CONFIDENCE: f64 = 0.6;

/// Resolution text used when the resolver cannot settle a conflict
pub const NO_RESOLUTION: &str = "No resolution available";

/// Kind of tension between two responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Contradiction,
    Inconsistency,
    Ambiguity,
    Completeness,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::Contradiction => "contradiction",
            ConflictType::Inconsistency => "inconsistency",
            ConflictType::Ambiguity => "ambiguity",
            ConflictType::Completeness => "completeness",
        }
    }
}

impl std::fmt::Display for ConflictType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// A detected tension between two responses and, once resolved, its resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResolution {
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    /// Agent ids of the two responses involved
    pub participants: [String; 2],
    /// What triggered detection, e.g. `"safe" vs "unsafe"`
    pub description: String,
    /// Empty until the resolver runs
    pub resolution: String,
    pub confidence: f64,
}

impl ConflictResolution {
    fn detected(
        conflict_type: ConflictType,
        severity: ConflictSeverity,
        a: &AgentResponse,
        b: &AgentResponse,
        description: String,
        confidence: f64,
    ) -> Self {
        Self {
            conflict_type,
            severity,
            participants: [a.agent_id.clone(), b.agent_id.clone()],
            description,
            resolution: String::new(),
            confidence,
        }
    }

    /// Whether the resolver produced an actual resolution
    pub fn is_resolved(&self) -> bool {
        !self.resolution.is_empty() && self.resolution != NO_RESOLUTION
    }

    pub fn involves(&self, agent_id: &str) -> bool {
        self.participants.iter().any(|p| p == agent_id)
    }
}

/// Find conflicts between every pair of responses.
///
/// A pair yields at most one contradiction (the first antonym pair found) and
/// at most one inconsistency.
pub fn detect_conflicts(responses: &[AgentResponse]) -> Vec<ConflictResolution> {
    let vocabularies: Vec<BTreeSet<String>> =
        responses.iter().map(|r| words(&r.content).collect()).collect();

    let mut conflicts = Vec::new();
    for i in 0..responses.len() {
        for j in (i + 1)..responses.len() {
            let (a, b) = (&responses[i], &responses[j]);

            if let Some((x, y)) = opposing_pair(&vocabularies[i], &vocabularies[j]) {
                conflicts.push(ConflictResolution::detected(
                    ConflictType::Contradiction,
                    ConflictSeverity::High,
                    a,
                    b,
                    format!("\"{}\" vs \"{}\"", x, y),
                    CONTRADICTION_CONFIDENCE,
                ));
            }

            let gap = (a.effective_confidence() - b.effective_confidence()).abs();
            if gap > INCONSISTENCY_THRESHOLD {
                conflicts.push(ConflictResolution::detected(
                    ConflictType::Inconsistency,
                    ConflictSeverity::Medium,
                    a,
                    b,
                    format!("confidence gap of {:.2}", gap),
                    INCONSISTENCY_CONFIDENCE,
                ));
            }
        }
    }
    conflicts
}

/// The first antonym pair split across the two vocabularies, in `(a's word, b's word)` order.
fn opposing_pair(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<(&'static str, &'static str)> {
    ANTONYM_PAIRS.iter().find_map(|&(x, y)| {
        if a.contains(x) && b.contains(y) {
            Some((x, y))
        } else if a.contains(y) && b.contains(x) {
            Some((y, x))
        } else {
            None
        }
    })
}

/// Resolve each conflict by deferring to the more confident participant.
///
/// Ties go to the first participant. A conflict whose participants cannot be
/// found among `responses` gets the [`NO_RESOLUTION`] placeholder instead of
/// failing the whole synthesis.
pub fn resolve_conflicts(conflicts: &mut [ConflictResolution], responses: &[AgentResponse]) {
    for conflict in conflicts.iter_mut() {
        let find = |id: &str| responses.iter().find(|r| r.agent_id == id);
        let (Some(a), Some(b)) = (find(&conflict.participants[0]), find(&conflict.participants[1]))
        else {
            conflict.resolution = NO_RESOLUTION.to_string();
            conflict.confidence = 0.0;
            continue;
        };

        let authoritative = if b.effective_confidence() > a.effective_confidence() {
            b
        } else {
            a
        };
        conflict.resolution = format!(
            "Deferring to {} (confidence {:.2}) on this {}",
            authoritative.agent_name(),
            authoritative.effective_confidence(),
            conflict.conflict_type
        );
    }
}

/// Append each resolved conflict's note to the content of its participants.
///
/// Notes are appended once per response even if the same text resolves several conflicts.
pub fn annotate_responses(
    responses: Vec<AgentResponse>,
    conflicts: &[ConflictResolution],
) -> Vec<AgentResponse> {
    responses
        .into_iter()
        .map(|mut response| {
            let mut seen = BTreeSet::new();
            for conflict in conflicts
                .iter()
                .filter(|c| c.is_resolved() && c.involves(&response.agent_id))
            {
                if seen.insert(conflict.resolution.as_str()) {
                    response
                        .content
                        .push_str(&format!("\n\n[Resolution: {}]", conflict.resolution));
                }
            }
            response
        })
        .collect()
}
