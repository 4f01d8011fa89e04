//! Agent entity - a persisted expert profile.
//!
//! Agents are created and updated by administrative tooling; the selection
//! pipeline only ever reads them.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an agent profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
            AgentStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional domain-expertise fields carried by specialist profiles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainExpertise {
    /// Primary field, e.g. "cardiology"
    pub primary: Option<String>,
    /// Narrower sub-specialties
    pub specializations: Vec<String>,
    /// Years of (simulated) practice, surfaced in agent cards
    pub experience_years: Option<u32>,
}

/// A named expert profile (Entity)
///
/// `capabilities` and `knowledge_domains` may be absent in stored rows; they
/// deserialize to empty lists and contribute nothing to ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    /// Unique machine name, e.g. "cardiology-expert"
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "system_instructions")]
    pub system_prompt: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub knowledge_domains: Vec<String>,
    /// Seniority rank; lower is more specialized and preferred
    #[serde(default = "default_tier")]
    pub tier: u8,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_expertise: Option<DomainExpertise>,
}

fn default_tier() -> u8 {
    3
}

impl Agent {
    /// Create an active agent with no capabilities or domains.
    ///
    /// `name` doubles as the display name until [`Agent::with_display_name`] is called.
    pub fn new(id: impl Into<String>, name: impl Into<String>, tier: u8) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            display_name: name.clone(),
            name,
            description: String::new(),
            system_prompt: String::new(),
            capabilities: Vec::new(),
            knowledge_domains: Vec::new(),
            tier,
            status: AgentStatus::Active,
            domain_expertise: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.knowledge_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_expertise(mut self, expertise: DomainExpertise) -> Self {
        self.domain_expertise = Some(expertise);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Tier clamped to at least 1 so that tier-based arithmetic never divides by zero.
    pub fn effective_tier(&self) -> u8 {
        self.tier.max(1)
    }

    /// Check the fields every stored agent must carry.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.trim().is_empty() {
            return Err(DomainError::invalid_agent(&self.name, "id is empty"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_agent(&self.id, "name is empty"));
        }
        Ok(())
    }

    /// Whether any knowledge-domain tag overlaps `domains` (case-insensitive, exact).
    pub fn has_any_domain(&self, domains: &[String]) -> bool {
        self.knowledge_domains
            .iter()
            .any(|own| domains.iter().any(|d| own.eq_ignore_ascii_case(d)))
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (tier {})", self.display_name, self.tier)
    }
}
