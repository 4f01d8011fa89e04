//! Query analysis value objects.
//!
//! A [`QueryAnalysis`] is derived once per query by the analyzer, consumed by
//! retrieval and ranking, and discarded after selection.

use serde::{Deserialize, Serialize};

/// Estimated complexity of a user query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "simple" => Ok(Complexity::Low),
            "medium" | "moderate" => Ok(Complexity::Medium),
            "high" | "complex" => Ok(Complexity::High),
            other => Err(format!("Unknown complexity: {}", other)),
        }
    }
}

/// Structured intent/domain/complexity profile of a free-text query
///
/// Field names on the wire follow the analyzer prompt contract
/// (`medicalTerms` in camelCase), while `medical_terms` is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    /// Free-form classification label, e.g. "diagnosis" or "general"
    #[serde(default = "default_intent")]
    pub intent: String,
    /// Ordered topic tags; the first one is the primary search filter
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, alias = "medical_terms")]
    pub medical_terms: Vec<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

/// Intent assigned when nothing more specific is known
pub const GENERAL_INTENT: &str = "general";

/// Confidence of the neutral analysis
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

fn default_intent() -> String {
    GENERAL_INTENT.to_string()
}

fn default_confidence() -> f64 {
    NEUTRAL_CONFIDENCE
}

impl QueryAnalysis {
    /// The neutral analysis returned whenever the analyzer cannot produce one.
    ///
    /// Downstream stages treat it as weak evidence, never as an error.
    pub fn neutral() -> Self {
        Self {
            intent: default_intent(),
            domains: Vec::new(),
            complexity: Complexity::Medium,
            keywords: Vec::new(),
            medical_terms: Vec::new(),
            confidence: NEUTRAL_CONFIDENCE,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = intent.into();
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// The first domain, used as the primary knowledge-domain search filter.
    pub fn primary_domain(&self) -> Option<&str> {
        self.domains.first().map(String::as_str)
    }

    /// Whether the intent carries information beyond the general fallback.
    pub fn has_specific_intent(&self) -> bool {
        !self.intent.trim().is_empty() && !self.intent.eq_ignore_ascii_case(GENERAL_INTENT)
    }

    /// Intent, keywords and domain terms as one list, for capability matching.
    pub fn match_terms(&self) -> Vec<&str> {
        let mut terms = Vec::with_capacity(1 + self.keywords.len() + self.medical_terms.len());
        if self.has_specific_intent() {
            terms.push(self.intent.as_str());
        }
        terms.extend(self.keywords.iter().map(String::as_str));
        terms.extend(self.medical_terms.iter().map(String::as_str));
        terms
    }
}

impl Default for QueryAnalysis {
    fn default() -> Self {
        Self::neutral()
    }
}
