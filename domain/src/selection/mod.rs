//! Agent selection domain

pub mod selector;

pub use selector::{AgentSelectionError, SelectionResult, select_best_agent};
