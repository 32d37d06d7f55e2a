//! Shared constants and invariants

/// Seconds subtracted from `expires_in` before caching an access token, so a
/// cached token stays valid for the duration of a whole batch.
pub const TOKEN_SAFETY_MARGIN_SECS: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// Single cache slot holding the access token.
pub const ACCESS_TOKEN_CACHE_KEY: &str = "fcm_courier_access_token";

pub const SCOPE_FIREBASE_MESSAGING: &str = "https://www.googleapis.com/auth/firebase.messaging";
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion `iat` is backdated to tolerate clock skew with the token server.
pub const ASSERTION_BACKDATE_SECS: i64 = 60;
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_FCM_URL: &str = "https://fcm.googleapis.com";
pub const DEFAULT_IID_URL: &str = "https://iid.googleapis.com";

pub const ACCESS_TOKEN_AUTH_HEADER: &str = "access_token_auth";
