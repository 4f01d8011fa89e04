//! Application layer for expert-panel
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BehaviorConfig, RetrievalConfig};
pub use ports::{
    agent_search::{AgentSearchPort, SearchError},
    agent_store::{AgentStorePort, StoreError},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    metrics::{MetricsSink, NoMetrics, OperationRecord},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::analyze_query::{AnalyzeQueryError, AnalyzeQueryUseCase};
pub use use_cases::find_candidates::FindCandidatesUseCase;
pub use use_cases::run_panel::{
    DEFAULT_PANEL_SIZE, PanelOutcome, RunPanelError, RunPanelInput, RunPanelUseCase,
};
pub use use_cases::select_agent::{AgentSelection, SelectAgentError, SelectAgentUseCase};
pub use use_cases::synthesize_responses::SynthesizeResponsesUseCase;
