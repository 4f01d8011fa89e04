//! JSONL file writer for operation metrics.
//!
//! Each [`OperationRecord`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.

use panel_application::ports::metrics::{MetricsSink, OperationRecord};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Metrics sink that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlMetricsSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlMetricsSink {
    /// Open (or create) the metrics file for appending.
    ///
    /// Creates parent directories if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create metrics directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open metrics file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the metrics file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Flatten a record into a JSON object tagged with `type` and `timestamp`.
fn to_line(record: &OperationRecord, timestamp: String) -> Option<String> {
    let mut value = serde_json::to_value(record).ok()?;
    let map = value.as_object_mut()?;
    let extra = map.remove("extra");
    map.remove("operation_type");
    map.insert(
        "type".to_string(),
        serde_json::Value::String(record.operation_type.to_string()),
    );
    map.insert(
        "timestamp".to_string(),
        serde_json::Value::String(timestamp),
    );
    if let Some(serde_json::Value::Object(extra)) = extra {
        for (key, value) in extra {
            map.entry(key).or_insert(value);
        }
    }
    serde_json::to_string(&value).ok()
}

impl MetricsSink for JsonlMetricsSink {
    fn record(&self, record: OperationRecord) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let Some(line) = to_line(&record, timestamp) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlMetricsSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
