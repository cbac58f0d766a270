//! Persistence adapter: one JSON document holding the whole [`Snapshot`].

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use super::models::Snapshot;
use super::seed::seed_snapshot;
use crate::fs_utils::write_atomic;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot {path} is not valid: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The on-disk location of the snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or does not parse.
    pub async fn read_existing(&self) -> Result<Option<Snapshot>, SnapshotError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| SnapshotError::Corrupt {
                    path: self.path.clone(),
                    source,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SnapshotError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read the snapshot, writing the seed snapshot first if the file does not exist.
    ///
    /// Seeding writes the file, so callers sharing a `SnapshotFile` must hold
    /// exclusive access.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or the
    /// seed snapshot cannot be written.
    pub async fn load(&self) -> Result<Snapshot, SnapshotError> {
        if let Some(snapshot) = self.read_existing().await? {
            return Ok(snapshot);
        }
        let seed = seed_snapshot(Utc::now());
        self.save(&seed).await?;
        info!(path = %self.path.display(), "Seeded new snapshot");
        Ok(seed)
    }

    /// Overwrite the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the atomic write fails. The previous
    /// snapshot is left intact in that case.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&self.path, json)
            .await
            .map_err(|source| SnapshotError::Write {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), "Snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_seeds_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = SnapshotFile::new(dir.path().join("data.json"));

        let snapshot = file.load().await.unwrap();
        assert_eq!(snapshot.posts.len(), 3);
        assert!(file.path().exists());

        let again = file.load().await.unwrap();
        assert_eq!(again, snapshot);
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SnapshotFile::new(&path).load().await.unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_load_tolerates_missing_collections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"nextPostId": 7, "nextCommentId": 2}"#).unwrap();

        let snapshot = SnapshotFile::new(&path).load().await.unwrap();
        assert_eq!(snapshot.next_post_id, 7);
        assert!(snapshot.users.is_empty());
        assert_eq!(snapshot.next_notification_id, 0);
    }

    #[tokio::test]
    async fn test_saved_json_uses_camel_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let file = SnapshotFile::new(&path);
        file.load().await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["nextPostId"], 4);
        assert_eq!(raw["nextCommentId"], 4);
        assert!(raw["posts"][0]["likedBy"].is_array());
        assert!(raw["posts"][0]["imageUrl"].is_string());
        assert!(raw["bookmarks"][0]["postId"].is_number());
    }
}
