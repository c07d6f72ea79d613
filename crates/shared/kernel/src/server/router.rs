use super::health;
use axum::extract::FromRef;
use sprout_storage::Storage;
use std::sync::LazyLock;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Routes every deployment exposes regardless of enabled features.
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    Storage: FromRef<S>,
{
    LazyLock::force(&health::STARTED);
    OpenApiRouter::<S>::new().routes(routes!(health::health_handler))
}
