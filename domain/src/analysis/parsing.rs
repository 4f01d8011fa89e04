//! Parsing of the analyzer model's reply.
//!
//! The model is asked to answer with a bare JSON object, but replies are often
//! wrapped in prose or Markdown fences. Parsing is pure text handling with no
//! fallback of its own: a reply that does not contain a valid object is an
//! error, and the caller decides what neutral value to use instead.

use super::query_analysis::QueryAnalysis;
use thiserror::Error;

/// Reasons an analyzer reply could not be turned into a [`QueryAnalysis`]
#[derive(Error, Debug)]
pub enum AnalysisParseError {
    #[error("response contains no JSON object")]
    NoJsonObject,

    #[error("invalid analysis JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Parse the analyzer's message content into a [`QueryAnalysis`].
///
/// # Supported Formats
///
/// 1. A bare JSON object
/// 2. A JSON object inside a Markdown code fence
/// 3. A JSON object embedded in surrounding prose
///
/// Confidence is clamped into `0.0..=1.0`; blank domain and keyword entries are dropped.
///
/// ```
/// use panel_domain::analysis::parse_analysis_response;
///
/// let a = parse_analysis_response(r#"{"intent":"treatment","confidence":0.7}"#).unwrap();
/// assert_eq!(a.intent, "treatment");
/// assert!(parse_analysis_response("no idea").is_err());
/// ```
pub fn parse_analysis_response(content: &str) -> Result<QueryAnalysis, AnalysisParseError> {
    let start = content.find('{').ok_or(AnalysisParseError::NoJsonObject)?;
    let end = content.rfind('}').ok_or(AnalysisParseError::NoJsonObject)?;
    if end < start {
        return Err(AnalysisParseError::NoJsonObject);
    }

    let mut analysis: QueryAnalysis = serde_json::from_str(&content[start..=end])?;

    analysis.confidence = if analysis.confidence.is_finite() {
        analysis.confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    analysis.domains.retain(|d| !d.trim().is_empty());
    analysis.keywords.retain(|k| !k.trim().is_empty());
    analysis.medical_terms.retain(|t| !t.trim().is_empty());

    Ok(analysis)
}
