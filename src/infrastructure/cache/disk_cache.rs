//! Local filesystem cache tier.
//!
//! Each entry lives at `{dir}/{key}.jpg`. Freshness is judged from the file's
//! modification time, so restarts keep the cache warm without any index.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::CacheKey;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, info, warn};

const ENTRY_EXTENSION: &str = "jpg";
const TMP_EXTENSION: &str = "tmp";

/// Distinguishes temp files of concurrent writers within one process.
static TMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Summary of what is currently stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskStats {
    pub entries: usize,
    pub expired: usize,
    pub total_bytes: u64,
}

/// Screenshot cache backed by a directory of files.
///
/// - TTL is enforced lazily: [`CacheService::get`] treats a stale file as a miss
///   and deletes it.
/// - Writes go to a unique temp file that is renamed into place, so readers
///   never observe a partially written image and the last writer wins.
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    /// Opens (and creates if needed) the cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`super::CacheError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>, ttl: Duration) -> CacheResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!("Disk cache at {} (TTL: {}s)", dir.display(), ttl.as_secs());
        Ok(Self { dir, ttl })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.{ENTRY_EXTENSION}"))
    }

    fn tmp_path(&self, key: &CacheKey) -> PathBuf {
        let seq = TMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{key}.{}.{seq}.{TMP_EXTENSION}",
            std::process::id()
        ))
    }

    fn is_expired(&self, modified: SystemTime) -> bool {
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age > self.ttl)
            .unwrap_or(false)
    }

    /// Walks the directory and reports entry counts and sizes.
    ///
    /// # Errors
    ///
    /// Returns [`super::CacheError::Io`] if the directory cannot be read.
    pub async fn stats(&self) -> CacheResult<DiskStats> {
        let mut stats = DiskStats::default();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !has_extension(&path, ENTRY_EXTENSION) {
                continue;
            }
            let Ok(meta) = entry.metadata().await else {
                continue;
            };

            stats.entries += 1;
            stats.total_bytes += meta.len();
            if meta.modified().is_ok_and(|m| self.is_expired(m)) {
                stats.expired += 1;
            }
        }

        Ok(stats)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

async fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl CacheService for DiskCache {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>> {
        let path = self.entry_path(key);

        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Disk MISS: {}", key);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if self.is_expired(meta.modified()?) {
            debug!("Disk EXPIRED: {}", key);
            remove_if_present(&path).await?;
            return Ok(None);
        }

        match fs::read(&path).await {
            Ok(payload) => {
                debug!("Disk HIT: {} ({} bytes)", key, payload.len());
                Ok(Some(Bytes::from(payload)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &CacheKey, payload: Bytes) -> CacheResult<()> {
        let tmp = self.tmp_path(key);
        let path = self.entry_path(key);

        if let Err(e) = fs::write(&tmp, &payload).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("Disk SET: {} ({} bytes)", key, payload.len());
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<bool> {
        let removed = remove_if_present(&self.entry_path(key)).await?;
        if removed {
            debug!("Disk DEL: {}", key);
        }
        Ok(removed)
    }

    async fn clear(&self) -> CacheResult<usize> {
        let mut removed = 0usize;
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_entry = has_extension(&path, ENTRY_EXTENSION);
            if !is_entry && !has_extension(&path, TMP_EXTENSION) {
                continue;
            }

            match remove_if_present(&path).await {
                Ok(true) if is_entry => removed += 1,
                Ok(_) => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        info!("Disk cache cleared ({} entries)", removed);
        Ok(removed)
    }

    async fn health_check(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(n: u64) -> CacheKey {
        CacheKey::derive("https://vimeo.com/1", n, 640, 360)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.put(&key(1), Bytes::from_static(b"jpeg")).await.unwrap();

        let hit = cache.get(&key(1)).await.unwrap();
        assert_eq!(hit.as_deref(), Some(&b"jpeg"[..]));
        assert!(dir.path().join(format!("{}.jpg", key(1))).exists());
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.get(&key(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss_and_removed() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_millis(50))
            .await
            .unwrap();

        cache.put(&key(1), Bytes::from_static(b"old")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get(&key(1)).await.unwrap().is_none());
        assert!(!dir.path().join(format!("{}.jpg", key(1))).exists());
    }

    #[tokio::test]
    async fn test_put_overwrites_last_write_wins() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.put(&key(1), Bytes::from_static(b"first")).await.unwrap();
        cache.put(&key(1), Bytes::from_static(b"second")).await.unwrap();

        let hit = cache.get(&key(1)).await.unwrap().unwrap();
        assert_eq!(&hit[..], b"second");
    }

    #[tokio::test]
    async fn test_put_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.put(&key(1), Bytes::from_static(b"a")).await.unwrap();
        cache.put(&key(2), Bytes::from_static(b"b")).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".jpg")));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.put(&key(1), Bytes::from_static(b"x")).await.unwrap();

        assert!(cache.delete(&key(1)).await.unwrap());
        assert!(!cache.delete(&key(1)).await.unwrap());
        assert!(cache.get(&key(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_entries_but_not_foreign_files() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.put(&key(1), Bytes::from_static(b"a")).await.unwrap();
        cache.put(&key(2), Bytes::from_static(b"b")).await.unwrap();
        std::fs::write(dir.path().join("README"), b"keep me").unwrap();
        std::fs::write(dir.path().join(".stale.1.2.tmp"), b"partial").unwrap();

        assert_eq!(cache.clear().await.unwrap(), 2);
        assert_eq!(cache.clear().await.unwrap(), 0);
        assert!(dir.path().join("README").exists());
        assert!(!dir.path().join(".stale.1.2.tmp").exists());
    }

    #[tokio::test]
    async fn test_stats_counts_entries_and_bytes() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Duration::from_secs(60))
            .await
            .unwrap();

        cache.put(&key(1), Bytes::from_static(b"abc")).await.unwrap();
        cache.put(&key(2), Bytes::from_static(b"de")).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.total_bytes, 5);
        assert_eq!(stats.expired, 0);
    }

    #[tokio::test]
    async fn test_open_creates_nested_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let cache = DiskCache::open(&nested, Duration::from_secs(60))
            .await
            .unwrap();

        assert!(nested.is_dir());
        assert!(cache.health_check().await);
    }
}
