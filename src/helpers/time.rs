use chrono::Utc;
use tokio::time::Instant;

use crate::utils::constants::TOKEN_SAFETY_MARGIN_SECS;

/// Cache TTL for a token the server declared valid for `expires_in` seconds.
pub fn token_ttl_seconds(expires_in: u64) -> u64 {
    expires_in.saturating_sub(TOKEN_SAFETY_MARGIN_SECS)
}

pub fn now_u64() -> u64 {
    now_i64().max(0) as u64
}

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}
