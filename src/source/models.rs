// src/source/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored report object that may be a version of a case's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionObject {
    pub key: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl VersionObject {
    /// Builds an object whose filename is the last path segment of `key`.
    pub fn from_key(key: &str, size: u64, last_modified: Option<DateTime<Utc>>) -> Self {
        Self { key: key.to_string(), filename: filename_of(key).to_string(), size, last_modified }
    }
}

/// Last `/`-separated segment of a storage key.
pub fn filename_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
