use axum::Router;
use axum::http::Method;
use sprout::domain::constants::DOCS_PATH;
use sprout::kernel::server::ApiState;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Sprout", description = "Early-access registry"))]
struct ApiDoc;

/// Assembles the HTTP application: API routes, request tracing, CORS and the docs UI.
pub fn init(state: ApiState) -> Router {
    let (api_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(sprout::server::router::api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    Router::new().merge(api_routes).merge(Scalar::with_url(DOCS_PATH, api_doc)).layer(cors())
}

/// Any origin may call the API with any headers; preflight requests get their own
/// `Origin` and requested headers echoed back.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
}
