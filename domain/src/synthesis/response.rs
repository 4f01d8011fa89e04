//! Synthesis value objects - inputs and outputs of the response synthesizer.

use super::conflict::ConflictResolution;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Metadata keys checked, in order, for an agent's human-readable name
const NAME_KEYS: &[&str] = &["agentName", "agent_name", "displayName", "display_name"];

/// One agent's answer to a query
///
/// Never mutated in place by the synthesizer beyond an appended conflict
/// resolution note on `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    #[serde(alias = "agent_id")]
    pub agent_id: String,
    pub content: String,
    pub confidence: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AgentResponse {
    pub fn new(agent_id: impl Into<String>, content: impl Into<String>, confidence: f64) -> Self {
        Self {
            agent_id: agent_id.into(),
            content: content.into(),
            confidence,
            metadata: Map::new(),
        }
    }

    /// Attach the agent's display name under `agentName`.
    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.metadata
            .insert("agentName".to_string(), Value::String(name.into()));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Display name from metadata, falling back to the agent id.
    pub fn agent_name(&self) -> &str {
        NAME_KEYS
            .iter()
            .find_map(|key| self.metadata.get(*key).and_then(Value::as_str))
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.agent_id)
    }

    /// Confidence usable in arithmetic: non-finite values count as zero.
    pub fn effective_confidence(&self) -> f64 {
        if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Preferred shape of the merged answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Narrative,
    Structured,
    Summary,
}

/// Preferred depth of the merged answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Brief,
    Standard,
    Comprehensive,
}

/// Caller-stated presentation preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub format: Option<ResponseFormat>,
    pub detail_level: Option<DetailLevel>,
}

/// Context handed to the synthesizer alongside the responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisContext {
    pub query: Option<String>,
    pub user_preferences: UserPreferences,
}

impl SynthesisContext {
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.user_preferences.format = Some(format);
        self
    }

    pub fn with_detail_level(mut self, level: DetailLevel) -> Self {
        self.user_preferences.detail_level = Some(level);
        self
    }
}

/// One contributing agent in a synthesized answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSource {
    pub agent_id: String,
    pub agent_name: String,
    pub excerpt: String,
    pub confidence: f64,
    /// Share of the merged answer attributed to this agent
    pub relevance: f64,
}

/// How a synthesized answer was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisMetadata {
    pub strategy: String,
    pub participant_count: usize,
    pub conflict_count: usize,
    pub resolution_count: usize,
    /// Observability only; never influences the content
    pub quality_score: f64,
    pub processing_time_ms: u64,
    pub conflicts: Vec<ConflictResolution>,
}

/// Merged answer of several agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedResponse {
    pub id: Uuid,
    pub content: String,
    pub confidence: f64,
    pub sources: Vec<ResponseSource>,
    pub metadata: SynthesisMetadata,
}
