//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid agent '{id}': {reason}")]
    InvalidAgent { id: String, reason: String },
}

impl DomainError {
    pub fn invalid_agent(id: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainError::InvalidAgent {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Reject blank questions before any external call is made.
pub fn validate_query(query: &str) -> Result<&str, DomainError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidQuery("question is empty".to_string()));
    }
    Ok(trimmed)
}
