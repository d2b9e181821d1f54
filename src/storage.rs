//! Uploads-directory capability object and filename sanitization.

use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tokio::fs::{self, OpenOptions};
use tokio::io::ErrorKind;

/// Wraps the flat uploads directory. All filesystem access to stored
/// files goes through this type, so client-supplied names are always
/// sanitized before touching disk.
#[derive(Clone, Debug)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Reduces a client-supplied name to its final path component and
    /// joins it onto the uploads root. Directory segments are
    /// discarded, so `../../etc/passwd` resolves to `<root>/passwd`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let base = Path::new(name.trim())
            .file_name()
            .ok_or(StorageError::InvalidName)?;
        Ok(self.root.join(base))
    }

    /// Lists stored files sorted by name. Directories, in-flight
    /// upload temp files, and other non-regular entries are skipped.
    pub async fn list(&self) -> Result<Vec<StoredFile>, StorageError> {
        let mut dir = fs::read_dir(&self.root).await?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if is_upload_temp(&name) {
                continue;
            }
            let modified = metadata
                .modified()
                .ok()
                .and_then(|ts| ts.duration_since(UNIX_EPOCH).ok())
                .map(format_timestamp);

            entries.push(StoredFile {
                name,
                size: metadata.len(),
                modified,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Removes a stored file: stat, reject directories, probe for
    /// read/write access by opening, then unlink. The probe makes
    /// file-ownership problems surface as a permission failure rather
    /// than a generic I/O error.
    pub async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let target = self.resolve(name)?;
        let metadata = match fs::metadata(&target).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound);
            }
            Err(err) => return Err(StorageError::Io(err)),
        };
        if metadata.is_dir() {
            return Err(StorageError::NotAFile);
        }

        match OpenOptions::new().read(true).write(true).open(&target).await {
            Ok(file) => drop(file),
            Err(_) => return Err(StorageError::PermissionDenied),
        }

        fs::remove_file(&target).await?;
        Ok(())
    }
}

/// Matches the `.<name>.tmp.<uuid>` names `AtomicFile` writes under.
/// Uploaded dotfiles do not match and stay visible in the index.
fn is_upload_temp(name: &str) -> bool {
    name.starts_with('.') && name.contains(".tmp.")
}

fn format_timestamp(duration: Duration) -> String {
    let datetime: DateTime<Utc> = (UNIX_EPOCH + duration).into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug)]
pub enum StorageError {
    InvalidName,
    NotFound,
    NotAFile,
    PermissionDenied,
    Io(io::Error),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: Option<String>,
}
