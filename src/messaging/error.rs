use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Server-defined error names.
///
/// See <https://firebase.google.com/docs/reference/fcm/rest/v1/ErrorCode>.
pub mod codes {
    /// 404, the app instance was unregistered (e.g. the app was removed).
    pub const UNREGISTERED: &str = "UNREGISTERED";
    /// 404, same meaning as `UNREGISTERED` on some endpoints.
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// 400, malformed message or registration token.
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    /// 429, sending rate too high.
    pub const QUOTA_EXCEEDED: &str = "QUOTA_EXCEEDED";
    /// 503, server overloaded.
    pub const UNAVAILABLE: &str = "UNAVAILABLE";
    /// 401, access token invalid or expired.
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    /// 401, APNs certificate or web push auth key invalid or missing.
    pub const THIRD_PARTY_AUTH_ERROR: &str = "THIRD_PARTY_AUTH_ERROR";
    pub const SENDER_ID_MISMATCH: &str = "SENDER_ID_MISMATCH";
    pub const INTERNAL: &str = "INTERNAL";

    // client-side placeholders
    pub const MISSING_ERROR: &str = "FCM_MISSING_ERROR";
    pub const MISSING_MESSAGE: &str = "FCM_MISSING_MESSAGE";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
}

/// One failed API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status, `0` when no response was received.
    pub http_status: u16,
    pub status_code: String,
    pub message: String,
    pub raw_body: String,
}

impl ApiError {
    pub fn new(
        http_status: u16,
        status_code: impl Into<String>,
        message: impl Into<String>,
        raw_body: impl Into<String>,
    ) -> Self {
        Self {
            http_status,
            status_code: status_code.into(),
            message: message.into(),
            raw_body: raw_body.into(),
        }
    }

    /// Parse an error body. Understands the FCM v1 shape
    /// `{"error": {"status", "message"}}`, the Instance ID shape
    /// `{"error": "..."}` and the OAuth shape `{"error", "error_description"}`.
    pub fn from_response(http_status: u16, raw_body: &str) -> Self {
        let json: Option<Value> = serde_json::from_str(raw_body).ok();
        let (code, message) = match json.as_ref().and_then(|v| v.get("error")) {
            Some(Value::Object(error)) => (
                error.get("status").and_then(Value::as_str),
                error.get("message").and_then(Value::as_str),
            ),
            Some(Value::String(error)) => (
                Some(error.as_str()),
                json.as_ref()
                    .and_then(|v| v.get("error_description").or_else(|| v.get("message")))
                    .and_then(Value::as_str),
            ),
            _ => (None, None),
        };

        Self::new(
            http_status,
            code.unwrap_or(codes::MISSING_ERROR),
            message.unwrap_or(codes::MISSING_MESSAGE),
            raw_body,
        )
    }

    /// No response at all: timeout, connection failure, aborted task.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, codes::TRANSPORT_ERROR, message, "")
    }

    /// Recipient permanently gone, safe to prune.
    pub fn is_unregistered(&self) -> bool {
        self.http_status == 404
            && (self.status_code == codes::UNREGISTERED || self.status_code == codes::NOT_FOUND)
    }

    /// Access token rejected.
    pub fn is_unauthenticated(&self) -> bool {
        self.http_status == 401 && self.status_code == codes::UNAUTHENTICATED
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.http_status, self.status_code, self.message)
    }
}

impl std::error::Error for ApiError {}
