use crate::EarlyAccess;
use crate::error::EarlyAccessError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::{Map, Value};
use sprout_domain::constants::EARLY_ACCESS_TAG;
use sprout_kernel::server::{ApiReply, ApiState};
use utoipa::ToSchema;

/// Early-access sign-up form, as documented.
///
/// The handler reads the body as a bare JSON object instead, so arrays and scalars are
/// never mistaken for a form.
#[derive(Debug, ToSchema)]
pub struct SubmitRequest {
    #[schema(example = "teacher@school.edu.cn")]
    pub email: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/early-access",
    request_body = SubmitRequest,
    responses(
        (status = OK, description = "Registered, or already on the list", body = ApiReply),
        (status = BAD_REQUEST, description = "Email missing or malformed", body = ApiReply),
        (status = INTERNAL_SERVER_ERROR, description = "Registry could not be read or written", body = ApiReply),
    ),
    tag = EARLY_ACCESS_TAG,
)]
pub(crate) async fn submit_handler(
    State(state): State<ApiState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<ApiReply, EarlyAccessError> {
    // A body that is not `{ "email": <string> }` counts as no email at all.
    let email = match &payload {
        Ok(Json(form)) => form.get("email").and_then(Value::as_str),
        Err(rejection) => {
            tracing::debug!(%rejection, "Unusable early-access payload");
            None
        },
    };

    let slice = state.try_get_slice::<EarlyAccess>().map_err(|e| e.to_string())?;
    slice.submit(email).await?;

    Ok(ApiReply::ok())
}
