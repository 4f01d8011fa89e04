//! Query analysis domain
//!
//! Turns the analyzer model's reply into a structured [`QueryAnalysis`].

pub mod parsing;
pub mod query_analysis;

pub use parsing::{AnalysisParseError, parse_analysis_response};
pub use query_analysis::{Complexity, GENERAL_INTENT, NEUTRAL_CONFIDENCE, QueryAnalysis};
