//! Text utilities shared by the ranker, the conflict detector and the formatters.

use std::collections::BTreeSet;

/// Words too common to carry any signal in lexical overlap scoring.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "what", "with", "this", "that", "from", "have", "has", "was",
    "were", "how", "why", "when", "which", "who", "can", "does", "about", "into", "your", "you",
    "our", "its", "not", "but", "all", "any", "there", "their", "them", "they", "should", "would",
    "could", "may", "might", "will", "been", "being", "also", "some", "more", "most", "such",
];

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Lowercased alphanumeric words of `text`, in order, including short and common words.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Distinct content-bearing terms of `text`: lowercased, at least three
/// characters, stopwords removed.
pub fn terms(text: &str) -> BTreeSet<String> {
    words(text)
        .filter(|w| w.chars().count() >= 3 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Share of `query_terms` found in `profile`, exactly or by a shared stem.
///
/// Returns 0.0 when there are no query terms.
pub fn coverage(query_terms: &[String], profile: &BTreeSet<String>) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let hits = query_terms
        .iter()
        .filter(|t| profile.contains(*t) || profile.iter().any(|p| shares_stem(p, t)))
        .count();
    hits as f64 / query_terms.len() as f64
}

/// Loose stem match so that "cardiac" meets "cardiology" and "symptom" meets "symptoms".
fn shares_stem(a: &str, b: &str) -> bool {
    const STEM: usize = 5;
    matches!((a.get(..STEM), b.get(..STEM)), (Some(x), Some(y)) if x == y)
}

/// Case-insensitive "either contains the other" match used for tag comparisons
/// (`"cardio"` matches `"cardiology"` and vice versa).
pub fn tags_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}
