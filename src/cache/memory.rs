use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::store::{Entry, TokenStore};
use crate::errors::FcmResult;

/// Process-local store: key -> entry
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())) }
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn get(&self, key: &str) -> FcmResult<Option<String>> {
        let map = self.inner.read().await;
        Ok(map.get(key)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> FcmResult<()> {
        let mut map = self.inner.write().await;
        map.insert(key.to_string(), Entry::new(value, ttl_secs));
        Ok(())
    }

    async fn forget(&self, key: &str) -> FcmResult<()> {
        self.inner.write().await.remove(key);
        Ok(())
    }

    async fn flush(&self) -> FcmResult<()> {
        self.inner.write().await.clear();
        Ok(())
    }
}
