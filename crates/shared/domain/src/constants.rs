//! `OpenAPI` tags, the docs path and user-facing messages.

pub const SYSTEM_TAG: &str = "System";
pub const EARLY_ACCESS_TAG: &str = "Early Access";

pub const DOCS_PATH: &str = "/api/docs";

/// Shown when the submission carries no usable email.
pub const MSG_MISSING_EMAIL: &str = "缺少邮箱";
/// Shown when the email does not look like `local@domain.tld`.
pub const MSG_INVALID_EMAIL: &str = "邮箱格式无效";
/// Shown for every server-side failure; details stay in the logs.
pub const MSG_SERVER_ERROR: &str = "服务器错误";
