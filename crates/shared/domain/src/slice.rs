//! Type-erased registry entries for feature slices.

use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

/// Shared state of a feature, stored in the API state and fetched back by type.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// A feature slice ready to be registered, keyed by its concrete type.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    /// Type name, for diagnostics only.
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>(), state: Box::new(state) }
    }

    #[must_use]
    pub fn is<T: FeatureSlice>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref()
    }
}
