use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::store::{Entry, TokenStore};
use crate::errors::{FcmError, FcmResult};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// JSON file store shared by every process pointing at the same path.
///
/// The file is re-read on every access and replaced atomically (temp file +
/// rename) on every write, so readers never observe a half-written document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // serializes read-modify-write cycles of this process
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp file, unique per process and per write.
    fn tmp_path(&self) -> PathBuf {
        let file_name = self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tokens".to_string());
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.path.with_file_name(format!(".{}.{}.{}.tmp", file_name, std::process::id(), seq))
    }

    async fn load(&self) -> FcmResult<HashMap<String, Entry>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("token store {} is not valid JSON, starting empty: {}", self.path.display(), e);
                HashMap::new()
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(FcmError::Store(format!("cannot read {}: {}", self.path.display(), e))),
        }
    }

    async fn save(&self, map: &HashMap<String, Entry>) -> FcmResult<()> {
        let content = serde_json::to_vec(map).map_err(|e| FcmError::Store(e.to_string()))?;
        let tmp = self.tmp_path();
        if let Err(e) = fs::write(&tmp, content).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(FcmError::Store(format!("cannot write {}: {}", tmp.display(), e)));
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(FcmError::Store(format!("cannot replace {}: {}", self.path.display(), e)));
        }
        debug!("token store {} written, {} entries", self.path.display(), map.len());
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileStore {
    async fn get(&self, key: &str) -> FcmResult<Option<String>> {
        let map = self.load().await?;
        Ok(map.get(key).filter(|entry| entry.is_live()).map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> FcmResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        map.retain(|_, entry| entry.is_live());
        map.insert(key.to_string(), Entry::new(value, ttl_secs));
        self.save(&map).await
    }

    async fn forget(&self, key: &str) -> FcmResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.load().await?;
        if map.remove(key).is_some() {
            self.save(&map).await?;
        }
        Ok(())
    }

    async fn flush(&self) -> FcmResult<()> {
        let _guard = self.write_lock.lock().await;
        self.save(&HashMap::new()).await
    }
}
