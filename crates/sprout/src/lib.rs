//! Facade over the Sprout shared crates and feature slices.
//!
//! Thin by intent: it composes crates, it does not implement business logic. The server
//! calls [`init`] once at startup and mounts [`server::router::api_router`].

pub use sprout_domain as domain;
pub use sprout_kernel as kernel;
pub use sprout_storage as storage;

use sprout_domain::config::ApiConfig;
use sprout_domain::slice::InitializedSlice;
use sprout_storage::Storage;

pub mod server {
    pub mod router {
        use sprout_kernel::server::ApiState;
        use utoipa_axum::router::OpenApiRouter;

        pub use sprout_kernel::server::router::system_router;

        /// System routes plus the routes of every compiled-in feature.
        #[must_use]
        pub fn api_router() -> OpenApiRouter<ApiState> {
            let router = system_router::<ApiState>();
            #[cfg(feature = "early-access")]
            let router = router.merge(crate::features::early_access::router());
            router
        }
    }
}

/// Feature crates compiled into this build.
pub mod features {
    #[cfg(feature = "early-access")]
    pub use sprout_early_access as early_access;

    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "early-access")]
        "early-access",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initializes every enabled feature slice.
///
/// # Errors
/// Returns the first feature initialization error.
#[allow(unused_variables)]
pub fn init(
    config: &ApiConfig,
    storage: &Storage,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let mut slices = Vec::with_capacity(features::ENABLED.len());

    #[cfg(feature = "early-access")]
    slices.push(features::early_access::init(config, storage)?);

    Ok(slices)
}
