use std::sync::Arc;
use tracing::debug;

use crate::cache::store::TokenStore;
use crate::errors::FcmResult;
use crate::helpers::time::token_ttl_seconds;
use crate::utils::constants::ACCESS_TOKEN_CACHE_KEY;

/// Access-token view over the external store: one slot, read-if-fresh,
/// write-with-expiry-margin.
#[derive(Debug, Clone)]
pub struct TokenCache {
    store: Arc<dyn TokenStore>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Cached token, if the slot holds a non-empty live value.
    pub async fn get_fresh(&self) -> FcmResult<Option<String>> {
        Ok(self.store
            .get(ACCESS_TOKEN_CACHE_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    /// Store a token the server declared valid for `expires_in` seconds.
    /// Returns the TTL used; a token too short-lived to outlast the margin is
    /// not stored and `0` is returned.
    pub async fn store(&self, token: &str, expires_in: u64) -> FcmResult<u64> {
        let ttl = token_ttl_seconds(expires_in);
        if ttl == 0 {
            debug!("access token expires in {}s, not caching", expires_in);
            return Ok(0);
        }
        self.store.put(ACCESS_TOKEN_CACHE_KEY, token, ttl).await?;
        debug!("access token cached for {}s", ttl);
        Ok(ttl)
    }

    pub async fn invalidate(&self) -> FcmResult<()> {
        self.store.forget(ACCESS_TOKEN_CACHE_KEY).await
    }
}
