//! Agent store and search adapters.
//!
//! - [`SupabaseAgentSearch`] / [`SupabaseAgentStore`]: hosted GraphRAG search and `agents` table
//! - [`InMemoryAgentCatalog`]: both ports over a JSON file, for offline use
//! - [`CircuitBreakerStore`]: guards a store against repeated failures

mod catalog;
mod circuit_breaker;
mod supabase;

pub use catalog::InMemoryAgentCatalog;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStore, CircuitState};
pub use supabase::{SupabaseAgentSearch, SupabaseAgentStore, SupabaseClient};
