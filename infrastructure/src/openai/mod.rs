//! Chat Completions adapter implementing the LLM gateway port.

mod gateway;
mod session;
mod types;

pub use gateway::OpenAiLlmGateway;
pub use session::OpenAiSession;
