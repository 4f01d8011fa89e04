//! Supabase adapters: GraphRAG search over PostgREST RPC and relational
//! queries over the `agents` table.

use crate::error::Result;
use async_trait::async_trait;
use panel_application::ports::agent_search::{AgentSearchPort, SearchError};
use panel_application::ports::agent_store::{AgentStorePort, StoreError};
use panel_domain::{Agent, AgentQuery, SearchHit, SearchRequest};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const AGENTS_TABLE: &str = "agents";

/// Shared PostgREST client carrying the project URL and service key.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Read the error body of a non-success response as `"<status>: <message>"`.
async fn failure_message(response: Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);
    format!("{}: {}", status.as_u16(), message)
}

/// Arguments of the hybrid search RPC function
#[derive(Debug, Serialize, PartialEq)]
struct HybridSearchArgs<'a> {
    query_text: &'a str,
    match_count: usize,
    similarity_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    knowledge_domain: Option<&'a str>,
    agent_status: &'a str,
}

impl<'a> From<&'a SearchRequest> for HybridSearchArgs<'a> {
    fn from(request: &'a SearchRequest) -> Self {
        Self {
            query_text: &request.query,
            match_count: request.top_k,
            similarity_threshold: request.min_similarity,
            knowledge_domain: request.filters.knowledge_domain.as_deref(),
            agent_status: request.filters.status.as_str(),
        }
    }
}

/// Graph-augmented hybrid search through a PostgREST RPC function.
#[derive(Debug, Clone)]
pub struct SupabaseAgentSearch {
    client: SupabaseClient,
    rpc_function: String,
}

impl SupabaseAgentSearch {
    pub fn new(client: SupabaseClient, rpc_function: impl Into<String>) -> Self {
        Self {
            client,
            rpc_function: rpc_function.into(),
        }
    }

    fn map_error(e: reqwest::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::Unavailable(e.to_string())
        } else {
            SearchError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl AgentSearchPort for SupabaseAgentSearch {
    async fn search(
        &self,
        request: &SearchRequest,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        let url = self.client.rest_url(&format!("rpc/{}", self.rpc_function));
        debug!(url = %url, top_k = request.top_k, "Calling GraphRAG search");

        let response = self
            .client
            .authorize(self.client.http.post(&url))
            .json(&HybridSearchArgs::from(request))
            .send()
            .await
            .map_err(Self::map_error)?;

        if !response.status().is_success() {
            return Err(SearchError::Request(failure_message(response).await));
        }

        let mut hits: Vec<SearchHit> = response.json().await.map_err(Self::map_error)?;
        hits.retain(|hit| hit.similarity >= request.min_similarity);
        hits.truncate(request.top_k);
        Ok(hits)
    }
}

/// PostgREST filter parameters for an [`AgentQuery`].
fn agent_query_params(query: &AgentQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("status", format!("eq.{}", query.status.as_str())),
    ];
    if let Some(domains) = &query.domains_overlap {
        let quoted: Vec<String> = domains
            .iter()
            .map(|d| format!("\"{}\"", d.replace('"', "")))
            .collect();
        params.push(("knowledge_domains", format!("ov.{{{}}}", quoted.join(","))));
    }
    params.push(("order", "tier.asc".to_string()));
    params.push(("limit", query.limit.to_string()));
    params
}

/// Relational queries against the `agents` table.
#[derive(Debug, Clone)]
pub struct SupabaseAgentStore {
    client: SupabaseClient,
}

impl SupabaseAgentStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn map_error(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Query(e.to_string())
        }
    }
}

#[async_trait]
impl AgentStorePort for SupabaseAgentStore {
    async fn query_agents(&self, query: &AgentQuery) -> std::result::Result<Vec<Agent>, StoreError> {
        let url = self.client.rest_url(AGENTS_TABLE);

        let response = self
            .client
            .authorize(self.client.http.get(&url))
            .query(&agent_query_params(query))
            .send()
            .await
            .map_err(Self::map_error)?;

        if !response.status().is_success() {
            return Err(StoreError::Query(failure_message(response).await));
        }

        let mut agents: Vec<Agent> = response.json().await.map_err(Self::map_error)?;
        agents.sort_by_key(|agent| agent.tier);
        agents.truncate(query.limit);
        Ok(agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_url_trims_slash() {
        let client = SupabaseClient::new("https://demo.supabase.co/", "key", None).unwrap();
        assert_eq!(
            client.rest_url("rpc/graphrag_hybrid_search"),
            "https://demo.supabase.co/rest/v1/rpc/graphrag_hybrid_search"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = SupabaseClient::new("https://demo.supabase.co", "secret", None).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_hybrid_search_args() {
        let request = SearchRequest::for_query("chest pain", &["cardiology".to_string()], 5);
        let args = serde_json::to_value(HybridSearchArgs::from(&request)).unwrap();
        assert_eq!(args["query_text"], "chest pain");
        assert_eq!(args["match_count"], 5);
        assert_eq!(args["similarity_threshold"], 0.6);
        assert_eq!(args["knowledge_domain"], "cardiology");
        assert_eq!(args["agent_status"], "active");
    }

    #[test]
    fn test_hybrid_search_args_without_domain() {
        let request = SearchRequest::for_query("tired all the time", &[], 3);
        let args = serde_json::to_value(HybridSearchArgs::from(&request)).unwrap();
        assert!(args.get("knowledge_domain").is_none());
    }

    #[test]
    fn test_fallback_query_params() {
        let query = AgentQuery::fallback(&["cardiology".to_string(), "endocrinology".to_string()], 5);
        let params = agent_query_params(&query);
        assert_eq!(
            params,
            vec![
                ("select", "*".to_string()),
                ("status", "eq.active".to_string()),
                (
                    "knowledge_domains",
                    "ov.{\"cardiology\",\"endocrinology\"}".to_string()
                ),
                ("order", "tier.asc".to_string()),
                ("limit", "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_emergency_query_params_have_no_domain_filter() {
        let params = agent_query_params(&AgentQuery::emergency(3));
        assert!(params.iter().all(|(k, _)| *k != "knowledge_domains"));
        assert!(params.contains(&("limit", "3".to_string())));
    }
}
