use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::{maintenance, security};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Marker embedded in temp file names; [`maintenance`] looks for it on startup.
pub(crate) const TMP_MARKER: &str = ".sprouttmp.";

#[derive(Debug)]
pub(crate) struct StorageInner {
    /// Canonical physical root; every resolved path must stay under it.
    pub(crate) root: PathBuf,
    pub(crate) tmp_counter: AtomicU64,
}

/// Cheaply cloneable handle to a sandboxed directory.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Storage {
    #[must_use]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Canonical root directory of this handle.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Resolves `path` relative to the root, rejecting absolute paths and anything
    /// that would escape the sandbox (including through symlinked parents).
    ///
    /// # Errors
    ///
    /// [`StorageError::PathTraversalAttempt`] on escape, [`StorageError::Io`] if an
    /// existing ancestor cannot be inspected.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.inner.root, path)
    }

    /// Whether `path` exists inside the sandbox.
    ///
    /// # Errors
    ///
    /// Only path resolution failures are reported; a missing file is `Ok(false)`.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.exists())
    }

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// [`StorageError::FileNotFound`] if it does not exist, [`StorageError::Io`] for any
    /// other read failure.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;
        self.read_optional_resolved(&resolved).await?.ok_or_else(|| StorageError::FileNotFound {
            message: resolved.display().to_string().into(),
            context: None,
        })
    }

    /// Reads a whole file, mapping "not found" to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] for permission problems and other read failures.
    pub async fn read_optional(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        let resolved = self.resolve(path)?;
        self.read_optional_resolved(&resolved).await
    }

    async fn read_optional_resolved(
        &self,
        resolved: &Path,
    ) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(resolved).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Replaces the contents of `path` atomically.
    ///
    /// Parent directories are created as needed. The data lands in a unique temp file
    /// next to the target, is synced, then renamed over the target; a crash at any
    /// point leaves either the old or the new contents.
    ///
    /// # Errors
    ///
    /// [`StorageError::PathTraversalAttempt`] if `path` escapes the sandbox,
    /// [`StorageError::Io`] for disk full, permission denied and similar failures.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directory {}", parent.display()))?;
        }

        let temp = self.tmp_path(&resolved);
        if let Err(err) = write_synced(&temp, data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err);
        }

        if let Err(err) = swap_into_place(&temp, &resolved).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err);
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File written atomically");
        Ok(())
    }

    /// Removes temp files left behind by interrupted writes.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.inner.root).await;
    }

    fn tmp_path(&self, target: &Path) -> PathBuf {
        let seq = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = target.file_name().and_then(|n| n.to_str()).unwrap_or("storage");
        target.with_file_name(format!("{name}{TMP_MARKER}{}.{seq}", std::process::id()))
    }
}

async fn write_synced(temp: &Path, data: &[u8]) -> Result<(), StorageError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(temp)
        .await
        .context(format!("Failed to create temp file {}", temp.display()))?;
    file.write_all(data).await.context(format!("Failed to write {}", temp.display()))?;
    file.sync_all().await.context(format!("Failed to sync {}", temp.display()))?;
    Ok(())
}

async fn swap_into_place(temp: &Path, target: &Path) -> Result<(), StorageError> {
    match fs::rename(temp, target).await {
        Ok(()) => Ok(()),
        // Some platforms refuse to rename over an existing file.
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            fs::remove_file(target)
                .await
                .context(format!("Failed to replace {}", target.display()))?;
            fs::rename(temp, target)
                .await
                .context(format!("Failed to move {} into place", temp.display()))
        },
        Err(err) => Err(StorageError::Io {
            source: err,
            context: Some(format!("Failed to move {} into place", temp.display()).into()),
        }),
    }
}

async fn sync_dir(dir: &Path) {
    // Directory fsync is best effort; not every platform supports it.
    match fs::File::open(dir).await {
        Ok(handle) => {
            if let Err(err) = handle.sync_all().await {
                debug!(path = %dir.display(), error = %err, "Directory sync skipped");
            }
        },
        Err(err) => warn!(path = %dir.display(), error = %err, "Directory open failed"),
    }
}
