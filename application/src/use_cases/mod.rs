//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_query;
pub mod find_candidates;
pub mod run_panel;
pub mod select_agent;
pub mod synthesize_responses;

#[cfg(test)]
pub(crate) mod test_support;
