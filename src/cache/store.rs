use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::FcmResult;
use crate::helpers::time::now_u64;

/// Key/value store with per-entry TTL, used to share the access token.
///
/// Implementations must give read-after-write consistency within a process;
/// staleness across processes only costs an extra forced refresh.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Value for `key` if present and not expired.
    async fn get(&self, key: &str) -> FcmResult<Option<String>>;

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> FcmResult<()>;

    async fn forget(&self, key: &str) -> FcmResult<()>;

    /// Remove every entry.
    async fn flush(&self) -> FcmResult<()>;
}

/// Stored value with its UNIX expiry timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub expires_at: u64,
}

impl Entry {
    pub fn new(value: &str, ttl_secs: u64) -> Self {
        Self {
            value: value.to_string(),
            expires_at: now_u64().saturating_add(ttl_secs),
        }
    }

    pub fn is_live(&self) -> bool {
        now_u64() < self.expires_at
    }
}
