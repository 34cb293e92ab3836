//! Checkpoint blobs as files, one per instance.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use vmtoken_ledger::{SnapshotStore, StoreError};

/// Stores `<dir>/<token_id>.json`, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, token_id: &str) -> Result<PathBuf, StoreError> {
        let safe = !token_id.is_empty()
            && token_id != "."
            && token_id != ".."
            && !token_id.contains(['/', '\\']);
        if !safe {
            return Err(StoreError::Unavailable(format!(
                "token id not usable as a file name: {token_id:?}"
            )));
        }
        Ok(self.dir.join(format!("{token_id}.json")))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, token_id: &str, blob: &str) -> Result<(), StoreError> {
        let path = self.path_for(token_id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), bytes = blob.len(), "[vmtoken] Checkpoint written");
        Ok(())
    }

    async fn load(&self, token_id: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(token_id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
