//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: chat-completion models used by the analyzer and panel
//! - [`error::DomainError`]: domain-level errors
//! - [`text`]: tokenisation helpers for the lexical heuristics

pub mod error;
pub mod model;
pub mod text;
