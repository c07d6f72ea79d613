//! The `{ ok, message }` envelope returned by every Sprout endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON reply envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiReply {
    /// Whether the request succeeded.
    pub ok: bool,
    /// Human-readable reason, present on failures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiReply {
    #[must_use]
    pub const fn ok() -> Self {
        Self { ok: true, message: None }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self { ok: false, message: Some(message.into()) }
    }

    /// Pairs the envelope with an HTTP status.
    #[must_use]
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_message() {
        assert_eq!(serde_json::to_string(&ApiReply::ok()).unwrap(), r#"{"ok":true}"#);
    }

    #[test]
    fn failure_carries_message() {
        let json = serde_json::to_value(ApiReply::failure("邮箱格式无效")).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": false, "message": "邮箱格式无效" }));
    }

    #[test]
    fn with_status_sets_code() {
        let response = ApiReply::failure("nope").with_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
