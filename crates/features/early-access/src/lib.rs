//! Early-access feature slice.
//!
//! Collects email addresses from the landing page: validates the submission, skips
//! addresses already on file (case-insensitively) and appends the rest to a JSON
//! registry on disk.

mod error;
mod handler;
mod store;
mod validation;

pub use crate::error::{EarlyAccessError, EarlyAccessErrorExt};
pub use crate::handler::SubmitRequest;
pub use crate::store::{RegistryStore, SubmitOutcome};
pub use crate::validation::normalize_email;

use sprout_kernel::domain::config::ApiConfig;
use sprout_kernel::domain::slice::InitializedSlice;
use sprout_kernel::server::ApiState;
use sprout_storage::Storage;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Early-access feature state.
#[sprout_derive::sprout_slice]
pub struct EarlyAccess {
    store: RegistryStore,
}

impl EarlyAccess {
    /// Registers `raw` for early access.
    ///
    /// Re-submitting a known address is a successful no-op reported as
    /// [`SubmitOutcome::AlreadyRegistered`].
    pub async fn submit(&self, raw: Option<&str>) -> Result<SubmitOutcome, EarlyAccessError> {
        let email = normalize_email(raw)?;
        let outcome = self.store.insert(email).await?;

        if outcome == SubmitOutcome::Registered {
            info!("Early-access registrant added");
        }
        Ok(outcome)
    }

    #[must_use]
    pub fn store(&self) -> &RegistryStore {
        &self.store
    }
}

/// Builds the slice on top of `storage`, using the registry path from `config`.
pub fn init(config: &ApiConfig, storage: &Storage) -> Result<InitializedSlice, EarlyAccessError> {
    let path = &config.storage.registry_file;
    storage.resolve(path).context("Registry path rejected")?;

    info!(path = %path.display(), "Early-access slice initialized");

    let slice = EarlyAccess::new(EarlyAccessInner { store: RegistryStore::new(storage.clone(), path) });
    Ok(InitializedSlice::new(slice))
}

/// HTTP routes of this feature.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(handler::submit_handler))
}
