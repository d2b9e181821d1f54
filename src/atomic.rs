//! Temp-file write with atomic rename into place.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use uuid::Uuid;

use crate::error::ApiError;

/// A file being written under a hidden temporary name and renamed over
/// the target only once the full body has been stored and synced.
/// Readers never observe a partially written upload, and an aborted
/// write leaves the previous file (if any) intact.
pub struct AtomicFile {
    target: PathBuf,
    temp_path: PathBuf,
    file: File,
}

impl AtomicFile {
    /// Creates the temp file next to the target path.
    pub async fn create(target: &Path) -> Result<Self, ApiError> {
        let parent = target
            .parent()
            .ok_or_else(|| ApiError::BadRequest("invalid target path".into()))?;
        let base = target
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| "file".into());
        let temp_path = parent.join(format!(".{base}.tmp.{}", Uuid::new_v4()));
        let file = File::create(&temp_path)
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        Ok(Self {
            target: target.to_path_buf(),
            temp_path,
            file,
        })
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Discards the temp file, leaving the target untouched.
    pub async fn cleanup(self) {
        drop(self.file);
        let _ = fs::remove_file(&self.temp_path).await;
    }

    /// Syncs the temp file and renames it over the target.
    pub async fn finalize(self) -> Result<(), ApiError> {
        self.file
            .sync_all()
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        drop(self.file);

        if let Err(err) = fs::rename(&self.temp_path, &self.target).await {
            let _ = fs::remove_file(&self.temp_path).await;
            return Err(ApiError::Internal(err.to_string()));
        }

        if let Some(parent) = self.target.parent() {
            let _ = sync_dir(parent).await;
        }

        Ok(())
    }
}

async fn sync_dir(path: &Path) -> io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let dir = std::fs::File::open(path)?;
        dir.sync_all()
    })
    .await
    .map_err(|err| io::Error::other(err.to_string()))?
}
