//! Logging infrastructure: structured operation metrics.
//!
//! - [`JsonlMetricsSink`]: appends one JSON line per pipeline operation

mod jsonl_metrics;

pub use jsonl_metrics::JsonlMetricsSink;
