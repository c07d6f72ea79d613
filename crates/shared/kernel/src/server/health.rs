use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Serialize;
use sprout_domain::constants::SYSTEM_TAG;
use sprout_storage::Storage;
use std::sync::LazyLock;
use std::time::Instant;
use utoipa::ToSchema;

/// Liveness and storage readiness.
#[derive(Debug, Serialize, ToSchema)]
pub(super) struct HealthReport {
    /// `up`, or `degraded` when the data directory is gone.
    status: &'static str,
    version: &'static str,
    /// Seconds since the router was built.
    uptime_secs: u64,
    storage_ready: bool,
}

pub(super) static STARTED: LazyLock<Instant> = LazyLock::new(Instant::now);

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service is up", body = HealthReport),
        (status = SERVICE_UNAVAILABLE, description = "Data directory unavailable", body = HealthReport),
    ),
    tag = SYSTEM_TAG,
)]
#[allow(clippy::unused_async)]
pub(super) async fn health_handler(State(storage): State<Storage>) -> impl IntoResponse {
    let storage_ready = storage.root().is_dir();
    let (code, status) =
        if storage_ready { (StatusCode::OK, "up") } else { (StatusCode::SERVICE_UNAVAILABLE, "degraded") };

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: STARTED.elapsed().as_secs(),
        storage_ready,
    };

    (code, [(header::CACHE_CONTROL, "no-store")], Json(report))
}

