//! Panel and synthesis configuration from TOML (`[panel]`, `[synthesis]`)

use serde::{Deserialize, Serialize};

/// Raw panel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePanelConfig {
    /// Agents asked per panel run
    pub size: usize,
    /// Default synthesis strategy; automatic when unset
    pub strategy: Option<String>,
}

impl Default for FilePanelConfig {
    fn default() -> Self {
        Self {
            size: 3,
            strategy: None,
        }
    }
}

/// Raw behavior configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Timeout in seconds for each external call
    pub timeout_seconds: Option<u64>,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Some(30),
        }
    }
}
