use axum::extract::FromRef;
use fxhash::FxHashMap;
use sprout_domain::config::ApiConfig;
use sprout_domain::slice::{FeatureSlice, InitializedSlice};
use sprout_storage::Storage;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, warn};

#[sprout_derive::sprout_error]
pub enum ApiStateError {
    #[error("Invalid API state{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Feature slice not registered{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub storage: Storage,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Shared handler state: configuration, the storage handle and every registered feature slice.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>()).and_then(InitializedSlice::downcast_ref)
    }

    /// Like [`ApiState::slice`], but reports which type was missing.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.inner.slices.len()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.config.clone()
    }
}

impl FromRef<ApiState> for Storage {
    fn from_ref(state: &ApiState) -> Self {
        state.storage.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    storage: Option<Storage>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Registers a slice; a second slice of the same type replaces the first.
    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        debug!(slice = slice.name, "Registering feature slice");
        if let Some(previous) = self.slices.insert(slice.id, slice) {
            warn!(slice = previous.name, "Feature slice registered twice, keeping the latest");
        }
        self
    }

    #[must_use]
    pub fn register_slices(self, slices: impl IntoIterator<Item = InitializedSlice>) -> Self {
        slices.into_iter().fold(self, Self::register_slice)
    }

    /// Falls back to the default configuration when none was given.
    ///
    /// # Errors
    ///
    /// [`ApiStateError::Validation`] when no storage handle was provided.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let storage = self.storage.ok_or("Storage not provided").map_err(|message| {
            ApiStateError::Validation { message: message.into(), context: None }
        })?;

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                config: self.config.unwrap_or_default(),
                storage,
                slices: self.slices,
            }),
        })
    }
}
