//! Prompt domain
//!
//! Templates for the analyzer call and for panel members answering a question.

mod template;

pub use template::PromptTemplate;
