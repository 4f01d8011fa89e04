//! Agent domain: expert profiles the pipeline selects between.

pub mod entities;

pub use entities::{Agent, AgentStatus, DomainExpertise};
