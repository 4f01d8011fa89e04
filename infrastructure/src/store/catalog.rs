//! In-memory agent catalog loaded from a JSON file.
//!
//! Serves both the search and the store ports so the pipeline can run
//! without a database. Search similarity is lexical term coverage over the
//! agent profile; there is no graph, so hits carry no traversal depth.

use crate::error::{InfraError, Result};
use async_trait::async_trait;
use panel_application::ports::agent_search::{AgentSearchPort, SearchError};
use panel_application::ports::agent_store::{AgentStorePort, StoreError};
use panel_domain::core::text::{coverage, terms};
use panel_domain::{Agent, AgentQuery, SearchHit, SearchHitMetadata, SearchRequest};
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentCatalog {
    agents: Vec<Agent>,
}

impl InMemoryAgentCatalog {
    /// Build a catalog, rejecting agents without an id or name.
    pub fn new(agents: Vec<Agent>) -> Result<Self> {
        for agent in &agents {
            agent.validate()?;
        }
        Ok(Self { agents })
    }

    /// Load a JSON array of agents.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| InfraError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let agents: Vec<Agent> =
            serde_json::from_str(&content).map_err(|source| InfraError::Catalog {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), count = agents.len(), "Loaded agent catalog");
        Self::new(agents)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn profile_terms(agent: &Agent) -> std::collections::BTreeSet<String> {
    terms(&format!(
        "{} {} {} {} {}",
        agent.name.replace(['-', '_'], " "),
        agent.display_name,
        agent.description,
        agent.capabilities.join(" "),
        agent.knowledge_domains.join(" "),
    ))
}

#[async_trait]
impl AgentSearchPort for InMemoryAgentCatalog {
    async fn search(&self, request: &SearchRequest) -> std::result::Result<Vec<SearchHit>, SearchError> {
        let query_terms: Vec<String> = terms(&request.query).into_iter().collect();
        let domain_filter = request
            .filters
            .knowledge_domain
            .as_ref()
            .map(|d| vec![d.clone()]);

        let mut hits: Vec<SearchHit> = self
            .agents
            .iter()
            .filter(|agent| agent.status == request.filters.status)
            .filter(|agent| {
                domain_filter
                    .as_deref()
                    .is_none_or(|domains| agent.has_any_domain(domains))
            })
            .map(|agent| SearchHit {
                agent: agent.clone(),
                similarity: coverage(&query_terms, &profile_terms(agent)),
                metadata: SearchHitMetadata::default(),
            })
            .filter(|hit| hit.similarity >= request.min_similarity)
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.agent.tier.cmp(&b.agent.tier))
        });
        hits.truncate(request.top_k);
        Ok(hits)
    }
}

#[async_trait]
impl AgentStorePort for InMemoryAgentCatalog {
    async fn query_agents(&self, query: &AgentQuery) -> std::result::Result<Vec<Agent>, StoreError> {
        let mut agents: Vec<Agent> = self
            .agents
            .iter()
            .filter(|agent| query.matches(agent))
            .cloned()
            .collect();
        agents.sort_by_key(|agent| agent.tier);
        agents.truncate(query.limit);
        Ok(agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_domain::AgentStatus;

    fn catalog() -> InMemoryAgentCatalog {
        InMemoryAgentCatalog::new(vec![
            Agent::new("gp", "general-practitioner", 3)
                .with_display_name("General Practitioner")
                .with_description("Everyday health questions")
                .with_domains(["general"]),
            Agent::new("cardio", "cardiology-expert", 1)
                .with_display_name("Cardiology Expert")
                .with_description("Heart rhythm and blood pressure")
                .with_domains(["cardiology"]),
            Agent::new("endo", "endocrinology-expert", 2)
                .with_display_name("Endocrinology Expert")
                .with_description("Diabetes and thyroid care")
                .with_domains(["endocrinology"]),
            Agent::new("old", "retired-expert", 1)
                .with_domains(["cardiology"])
                .with_status(AgentStatus::Archived),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_scores_by_term_coverage() {
        let request = SearchRequest::for_query("heart rhythm problems", &[], 5)
            .with_min_similarity(0.5);
        let hits = catalog().search(&request).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].agent.id, "cardio");
        assert!((hits[0].similarity - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(hits[0].metadata.graph_depth, None);
    }

    #[tokio::test]
    async fn test_search_applies_domain_filter() {
        let request = SearchRequest::for_query("thyroid care", &["cardiology".to_string()], 5)
            .with_min_similarity(0.0);
        let hits = catalog().search(&request).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].agent.id, "cardio");
    }

    #[tokio::test]
    async fn test_store_orders_by_tier_and_limits() {
        let agents = catalog()
            .query_agents(&AgentQuery::emergency(2))
            .await
            .unwrap();
        let ids: Vec<_> = agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["cardio", "endo"]);
    }

    #[tokio::test]
    async fn test_store_filters_domains() {
        let query = AgentQuery::fallback(&["endocrinology".to_string()], 5);
        let agents = catalog().query_agents(&query).await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id, "endo");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.json");
        std::fs::write(
            &path,
            r#"[{"id": "gp", "name": "general-practitioner", "display_name": "GP", "tier": 3}]"#,
        )
        .unwrap();

        let catalog = InMemoryAgentCatalog::from_file(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.agents()[0].capabilities.is_empty());
    }

    #[test]
    fn test_from_file_rejects_blank_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.json");
        std::fs::write(&path, r#"[{"id": "", "name": "x", "display_name": "X"}]"#).unwrap();

        let err = InMemoryAgentCatalog::from_file(&path).unwrap_err();
        assert!(matches!(err, InfraError::InvalidAgent(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = InMemoryAgentCatalog::from_file("/nonexistent/agents.json").unwrap_err();
        assert!(matches!(err, InfraError::Io { .. }));
    }
}
