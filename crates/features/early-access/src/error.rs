use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sprout_domain::constants::{MSG_INVALID_EMAIL, MSG_MISSING_EMAIL, MSG_SERVER_ERROR};
use sprout_kernel::server::ApiReply;
use sprout_storage::StorageError;
use std::borrow::Cow;

/// A specialized [`EarlyAccessError`] enum of this crate.
#[sprout_derive::sprout_error]
pub enum EarlyAccessError {
    /// No usable email text in the submission.
    #[error("Missing email{}: {message}", format_context(.context))]
    MissingInput { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Text that is not shaped like `local@domain.tld`.
    #[error("Invalid email format{}: {message}", format_context(.context))]
    InvalidFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Registry storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Registry encoding failure{}: {source}", format_context(.context))]
    Encode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal early-access error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl EarlyAccessError {
    /// Whether the caller, not the server, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingInput { .. } | Self::InvalidFormat { .. })
    }

    pub(crate) fn missing(message: impl Into<Cow<'static, str>>) -> Self {
        Self::MissingInput { message: message.into(), context: None }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidFormat { message: message.into(), context: None }
    }
}

/// Clients only ever see the fixed messages; server-side causes go to the log.
impl IntoResponse for EarlyAccessError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingInput { .. } => (StatusCode::BAD_REQUEST, MSG_MISSING_EMAIL),
            Self::InvalidFormat { .. } => (StatusCode::BAD_REQUEST, MSG_INVALID_EMAIL),
            Self::Storage { .. } | Self::Encode { .. } | Self::Internal { .. } => {
                tracing::error!(error = %self, "Early-access submission failed");
                (StatusCode::INTERNAL_SERVER_ERROR, MSG_SERVER_ERROR)
            },
        };

        if status.is_client_error() {
            tracing::debug!(reason = %self, "Early-access submission rejected");
        }

        ApiReply::failure(message).with_status(status)
    }
}
