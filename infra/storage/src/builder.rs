use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl private::Sealed for NoRoot {}
impl private::Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug)]
pub struct StorageBuilder<S: private::Sealed = NoRoot> {
    state: S,
    create: bool,
}

impl Default for StorageBuilder<NoRoot> {
    fn default() -> Self {
        Self { state: NoRoot, create: true }
    }
}

#[allow(private_bounds)]
impl<S: private::Sealed> StorageBuilder<S> {
    /// Whether [`StorageBuilder::connect`] may create a missing root directory. Defaults to `true`.
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        StorageBuilder { state: WithRoot(path.into()), create: self.create }
    }
}

impl StorageBuilder<WithRoot> {
    /// Opens the storage root.
    ///
    /// Creates the directory when allowed, canonicalizes it so later sandbox checks
    /// compare physical paths, then purges stale temp files (cleanup failures are
    /// logged, never returned).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root is missing and `create(false)` was set,
    /// or if it cannot be created or resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = self.state.0;

        if self.create {
            fs::create_dir_all(&root)
                .await
                .context(format!("Failed to create storage root {}", root.display()))?;
        }

        let root = fs::canonicalize(&root)
            .await
            .context(format!("Failed to resolve storage root {}", root.display()))?;

        info!(path = %root.display(), "Storage root ready");

        let storage =
            Storage { inner: Arc::new(StorageInner { root, tmp_counter: AtomicU64::new(1) }) };
        storage.purge_tmp().await;

        Ok(storage)
    }
}
