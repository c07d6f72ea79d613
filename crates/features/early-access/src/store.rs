use crate::error::{EarlyAccessError, EarlyAccessErrorExt};
use sprout_domain::registrant::{RegistrantRecord, Registry};
use sprout_storage::Storage;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// What a submission did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Registered,
    AlreadyRegistered,
}

/// Handle to the persisted registry file.
///
/// Every read-modify-write cycle runs under one async lock, so concurrent
/// submissions against the same store never drop each other's records.
#[derive(Debug)]
pub struct RegistryStore {
    storage: Storage,
    path: PathBuf,
    lock: Mutex<()>,
}

impl RegistryStore {
    pub fn new(storage: Storage, path: impl Into<PathBuf>) -> Self {
        Self { storage, path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current registry contents.
    ///
    /// A missing file reads as empty. So does a file that is not a valid registry; that
    /// case is logged and the next successful insert overwrites it.
    pub async fn load(&self) -> Result<Registry, EarlyAccessError> {
        let Some(bytes) = self
            .storage
            .read_optional(&self.path)
            .await
            .context("Failed to read registry")?
        else {
            return Ok(Registry::default());
        };

        match serde_json::from_slice::<Registry>(&bytes) {
            Ok(registry) => Ok(registry),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Registry file is unreadable, treating it as empty"
                );
                Ok(Registry::default())
            },
        }
    }

    /// Appends `email` unless a case-insensitive match is already stored.
    ///
    /// `email` must already be trimmed and validated. The file is rewritten in full only
    /// when a record is added.
    pub async fn insert(&self, email: &str) -> Result<SubmitOutcome, EarlyAccessError> {
        let _guard = self.lock.lock().await;

        let mut registry = self.load().await?;
        if !registry.insert(RegistrantRecord::new(email)) {
            debug!(records = registry.len(), "Email already registered");
            return Ok(SubmitOutcome::AlreadyRegistered);
        }

        self.persist(&registry).await?;
        Ok(SubmitOutcome::Registered)
    }

    async fn persist(&self, registry: &Registry) -> Result<(), EarlyAccessError> {
        let bytes = serde_json::to_vec_pretty(registry).context("Failed to encode registry")?;
        self.storage.write(&self.path, &bytes).await.context("Failed to write registry")?;
        debug!(path = %self.path.display(), records = registry.len(), "Registry persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn store(dir: &TempDir) -> RegistryStore {
        let storage = Storage::builder().root(dir.path()).connect().await.unwrap();
        RegistryStore::new(storage, "data/emails.json")
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).await.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_creates_parent_and_file() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;

        assert_eq!(store.insert("a@b.co").await.unwrap(), SubmitOutcome::Registered);
        assert!(dir.path().join("data/emails.json").is_file());
    }

    #[tokio::test]
    async fn duplicate_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        store.insert("A@B.co").await.unwrap();
        let before = std::fs::read(dir.path().join("data/emails.json")).unwrap();

        assert_eq!(store.insert("a@b.CO").await.unwrap(), SubmitOutcome::AlreadyRegistered);
        assert_eq!(std::fs::read(dir.path().join("data/emails.json")).unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/emails.json"), b"{ not json").unwrap();

        assert!(store(&dir).await.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persisted_form_is_a_pretty_array() {
        let dir = TempDir::new().unwrap();
        store(&dir).await.insert("a@b.co").await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("data/emails.json")).unwrap();
        assert!(text.starts_with("[\n  {"));
        assert!(text.contains("\"timestamp\""));
    }
}
