use std::sync::Arc;

use crate::config::settings::CacheConfig;

pub mod file;
pub mod memory;
pub mod store;
pub mod token_cache;

use file::FileStore;
use memory::MemoryStore;
use store::TokenStore;

/// Build the token store described by the config.
pub fn build_store(cfg: &CacheConfig) -> Arc<dyn TokenStore> {
    match cfg {
        CacheConfig::Memory => Arc::new(MemoryStore::new()),
        CacheConfig::File { path } => Arc::new(FileStore::new(path.clone())),
    }
}
