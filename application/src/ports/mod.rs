//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_search;
pub mod agent_store;
pub mod llm_gateway;
pub mod metrics;
pub mod progress;
