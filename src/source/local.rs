// src/source/local.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Component, Path, PathBuf};

use crate::source::{VersionObject, VersionSource};
use crate::utils::error::SourceError;

/// Versions stored on disk as `<root>/<case_id>/Output/<file>`.
/// Keys are the paths relative to `root`.
#[derive(Debug, Clone)]
pub struct LocalVersionStore {
    root: PathBuf,
}

impl LocalVersionStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Resolves a key below the root, refusing anything that could escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(key);
        if key.is_empty() || relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(SourceError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl VersionSource for LocalVersionStore {
    async fn list_objects(&self, case_id: &str) -> Result<Vec<VersionObject>, SourceError> {
        let prefix = format!("{}/Output", case_id);
        let dir = self.resolve(&prefix)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("No output directory for case {} at {}", case_id, dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
            objects.push(VersionObject::from_key(&format!("{}/{}", prefix, name), metadata.len(), modified));
        }
        // read_dir order is platform dependent
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!("Listed {} objects for case {}", objects.len(), case_id);
        Ok(objects)
    }

    async fn fetch_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Version object not found: {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
