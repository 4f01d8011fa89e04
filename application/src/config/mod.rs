//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`BehaviorConfig`]: per-call deadlines for external collaborators
//! - [`RetrievalConfig`]: candidate counts and similarity floor

pub mod behavior;
pub mod retrieval;

pub use behavior::BehaviorConfig;
pub use retrieval::RetrievalConfig;
