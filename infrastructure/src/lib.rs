//! Infrastructure layer for expert-panel
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod error;
pub mod logging;
pub mod openai;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLlmConfig, FileOutputConfig,
    FileOutputFormat, FileSearchConfig,
};
pub use error::{InfraError, Result};
pub use logging::JsonlMetricsSink;
pub use openai::{OpenAiLlmGateway, OpenAiSession};
pub use store::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStore, CircuitState, InMemoryAgentCatalog,
    SupabaseAgentSearch, SupabaseAgentStore, SupabaseClient,
};
