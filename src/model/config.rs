use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Board-wide policy configuration, loaded from TOML.
///
/// Every section and field has a default, so an empty document is a valid
/// config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// What happens to a group's tasks when the group is deleted.
    #[serde(default)]
    pub group_delete: GroupDeletePolicy,
}

/// Product policy for group deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupDeletePolicy {
    /// Delete the group's tasks together with their full subtrees.
    #[default]
    Cascade,
    /// Keep the tasks; clear their group reference so they become top-level.
    Detach,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Broadcast task-completed events to observers.
    #[serde(default = "default_true")]
    pub task_completed: bool,
    /// Broadcast group added/deleted events to observers.
    #[serde(default = "default_true")]
    pub group_changes: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            task_completed: true,
            group_changes: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl BoardConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }
}
