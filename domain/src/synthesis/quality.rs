//! Post-synthesis quality score.
//!
//! The score is computed on a 0-100 point scale and reported as a fraction.
//! It is informational only and never feeds back into strategy choice.

/// Points per unit of synthesized confidence
const CONFIDENCE_POINTS: f64 = 40.0;
/// Points lost per detected conflict
const CONFLICT_PENALTY: f64 = 5.0;
/// Points per participating response
const PARTICIPANT_POINTS: f64 = 2.0;
/// Cap on participant points
const PARTICIPANT_CAP: f64 = 20.0;
/// Points for resolving every detected conflict
const RESOLUTION_POINTS: f64 = 20.0;

/// Quality of a synthesis run, always in `[0, 1]`.
///
/// The resolution rate is `resolved / conflicts`, or 1 when nothing conflicted.
///
/// ```
/// use panel_domain::synthesis::quality_score;
///
/// // 0.8 * 40 + 3 * 2 + 20 = 58 points
/// assert!((quality_score(0.8, 0, 0, 3) - 0.58).abs() < 1e-9);
/// ```
pub fn quality_score(confidence: f64, conflicts: usize, resolved: usize, participants: usize) -> f64 {
    let confidence = if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let resolution_rate = if conflicts == 0 {
        1.0
    } else {
        resolved.min(conflicts) as f64 / conflicts as f64
    };

    let points = confidence * CONFIDENCE_POINTS - CONFLICT_PENALTY * conflicts as f64
        + (PARTICIPANT_POINTS * participants as f64).min(PARTICIPANT_CAP)
        + RESOLUTION_POINTS * resolution_rate;

    (points / 100.0).clamp(0.0, 1.0)
}
