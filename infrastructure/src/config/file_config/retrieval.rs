//! Retrieval configuration from TOML (`[search]`, `[circuit_breaker]`, `[catalog]`)

use panel_domain::retrieval::{DEFAULT_EMERGENCY_LIMIT, DEFAULT_MIN_SIMILARITY, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw Supabase search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSearchConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`; unset disables the Supabase adapters
    pub supabase_url: Option<String>,
    /// Environment variable holding the service key
    pub api_key_env: String,
    /// Postgres function behind the GraphRAG hybrid search
    pub rpc_function: String,
    pub top_k: usize,
    pub min_similarity: f64,
    pub emergency_limit: usize,
}

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self {
            supabase_url: None,
            api_key_env: "SUPABASE_SERVICE_ROLE_KEY".to_string(),
            rpc_function: "graphrag_hybrid_search".to_string(),
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            emergency_limit: DEFAULT_EMERGENCY_LIMIT,
        }
    }
}

impl FileSearchConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Raw circuit breaker configuration for the relational fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Half-open successes that close it again
    pub success_threshold: u32,
    /// How long the circuit stays open before a trial call
    pub timeout_seconds: u64,
}

impl Default for FileCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout_seconds: 30,
        }
    }
}

/// Local agent catalog used instead of Supabase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCatalogConfig {
    /// JSON array of agents
    pub path: Option<PathBuf>,
}
