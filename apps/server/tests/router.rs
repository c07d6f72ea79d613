use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use sprout::domain::config::{ApiConfig, SslConfig};
use sprout_server::{Server, router};
use tempfile::TempDir;
use tower::ServiceExt;

async fn app(dir: &TempDir) -> Router {
    let mut cfg = ApiConfig::default();
    cfg.storage.data_dir = dir.path().to_path_buf();

    let server = Server::builder().config(cfg).build().await.unwrap();
    router::init(server.state().clone())
}

fn submission(email: &str) -> Request<Body> {
    Request::post("/api/early-access")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "https://landing.example")
        .body(Body::from(format!(r#"{{"email":"{email}"}}"#)))
        .unwrap()
}

#[tokio::test]
async fn build_registers_feature_slices() {
    let dir = TempDir::new().unwrap();
    let mut cfg = ApiConfig::default();
    cfg.storage.data_dir = dir.path().join("nested/data");

    let server = Server::builder().config(cfg).port(0).build().await.unwrap();

    assert_eq!(server.state().slice_count(), sprout::features::ENABLED.len());
    assert_eq!(server.state().config.server.port, 0);
    assert!(dir.path().join("nested/data").is_dir());
}

#[tokio::test]
async fn build_fails_on_missing_tls_files() {
    let dir = TempDir::new().unwrap();
    let mut cfg = ApiConfig::default();
    cfg.storage.data_dir = dir.path().to_path_buf();
    cfg.server.ssl = Some(SslConfig { cert: dir.path().join("no-cert.pem"), key: dir.path().join("no-key.pem") });

    let err = Server::builder().config(cfg).build().await.unwrap_err();

    assert!(err.to_string().contains("certificate"));
}

#[tokio::test]
async fn submission_is_persisted_under_data_dir() {
    let dir = TempDir::new().unwrap();

    let response = app(&dir).await.oneshot(submission("teacher@school.edu.cn")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = std::fs::read_to_string(dir.path().join("data/emails.json")).unwrap();
    assert!(stored.contains("teacher@school.edu.cn"));
}

#[tokio::test]
async fn cross_origin_responses_echo_the_origin() {
    let dir = TempDir::new().unwrap();

    let response = app(&dir).await.oneshot(submission("not-an-email")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://landing.example"
    );
}

#[tokio::test]
async fn preflight_is_answered() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/early-access")
        .header(header::ORIGIN, "https://elsewhere.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app(&dir).await.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://elsewhere.example"
    );
    let methods = response.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap();
    assert!(methods.to_str().unwrap().contains("POST"));
}

#[tokio::test]
async fn preflight_echoes_requested_headers() {
    let dir = TempDir::new().unwrap();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/early-access")
        .header(header::ORIGIN, "https://elsewhere.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type,x-requested-with,x-client-version")
        .body(Body::empty())
        .unwrap();

    let response = app(&dir).await.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_lowercase();
    for name in ["content-type", "x-requested-with", "x-client-version"] {
        assert!(allowed.contains(name), "{name} missing from {allowed}");
    }
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir).await;

    let health = app.clone().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body = to_bytes(health.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "up");

    let docs = app.oneshot(Request::get("/api/docs").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(docs.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let dir = TempDir::new().unwrap();

    let response =
        app(&dir).await.oneshot(Request::get("/api/early-access/list").body(Body::empty()).unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
