//! Response synthesis domain
//!
//! Merges several [`AgentResponse`]s into one [`SynthesizedResponse`]:
//! blank responses are filtered, conflicts between the rest are detected and
//! resolved, and a registered strategy renders the final content.

pub mod conflict;
pub mod quality;
pub mod response;
pub mod strategies;
pub mod strategy;
pub mod synthesizer;

pub use conflict::{
    ConflictResolution, ConflictSeverity, ConflictType, annotate_responses, detect_conflicts,
    resolve_conflicts,
};
pub use quality::quality_score;
pub use response::{
    AgentResponse, DetailLevel, ResponseFormat, ResponseSource, SynthesisContext,
    SynthesisMetadata, SynthesizedResponse, UserPreferences,
};
pub use strategy::{
    StrategyCharacter, StrategyFn, StrategyOutput, StrategyRegistry, StrategyRequirements,
    StrategyScoring, SynthesisStrategy,
};
pub use synthesizer::{ResponseSynthesizer, StrategyChoice, SynthesisError};
