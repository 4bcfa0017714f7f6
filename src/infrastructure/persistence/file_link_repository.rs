//! Flat-file implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

type LinkMap = BTreeMap<String, ShortLink>;

/// Identity of the link file as last seen by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

struct Snapshot {
    links: LinkMap,
    stamp: Option<FileStamp>,
}

/// Link store persisted as one JSON object keyed by short id.
///
/// The mapping is cached in memory together with the file's mtime and size.
/// Reads compare that stamp with the file and reload when another process
/// (the admin CLI, a second instance) has rewritten it. Mutations always
/// reload, apply and rewrite the file (temp file + rename) under the write
/// lock, so a change is on disk before the call returns and changes made
/// elsewhere are not overwritten.
pub struct FileLinkRepository {
    path: PathBuf,
    snapshot: RwLock<Snapshot>,
}

impl FileLinkRepository {
    /// Loads the link file, treating a missing file as an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the file exists but cannot be read
    /// or parsed, or if its directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create link directory", &path, &e))?;
        }

        let stamp = file_stamp(&path).await?;
        let links = load(&path).await?;

        info!("Loaded {} links from {}", links.len(), path.display());

        Ok(Self {
            path,
            snapshot: RwLock::new(Snapshot { links, stamp }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the snapshot with the current file contents.
    async fn reload(&self, snapshot: &mut Snapshot) -> Result<(), AppError> {
        snapshot.stamp = file_stamp(&self.path).await?;
        snapshot.links = load(&self.path).await?;
        Ok(())
    }

    /// Read access to the snapshot, reloaded first if the file changed.
    async fn read(&self) -> Result<RwLockReadGuard<'_, Snapshot>, AppError> {
        let current = file_stamp(&self.path).await?;
        {
            let snapshot = self.snapshot.read().await;
            if snapshot.stamp == current {
                return Ok(snapshot);
            }
        }

        let mut snapshot = self.snapshot.write().await;
        self.reload(&mut snapshot).await?;
        debug!(
            "Reloaded {} links from {} after external change",
            snapshot.links.len(),
            self.path.display()
        );
        Ok(snapshot.downgrade())
    }

    async fn persist(&self, snapshot: &mut Snapshot) -> Result<(), AppError> {
        let payload = serde_json::to_vec_pretty(&snapshot.links)
            .map_err(|e| storage_error("serialize links", &self.path, &e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(format!(".{}.tmp", std::process::id()));
        let tmp = PathBuf::from(tmp);

        if let Err(e) = fs::write(&tmp, &payload).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(storage_error("write link file", &self.path, &e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(storage_error("replace link file", &self.path, &e));
        }

        snapshot.stamp = file_stamp(&self.path).await?;
        debug!(
            "Persisted {} links to {}",
            snapshot.links.len(),
            self.path.display()
        );
        Ok(())
    }
}

async fn file_stamp(path: &Path) -> Result<Option<FileStamp>, AppError> {
    match fs::metadata(path).await {
        Ok(meta) => {
            let modified = meta
                .modified()
                .map_err(|e| storage_error("stat link file", path, &e))?;
            Ok(Some(FileStamp {
                modified,
                len: meta.len(),
            }))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(storage_error("stat link file", path, &e)),
    }
}

async fn load(path: &Path) -> Result<LinkMap, AppError> {
    match fs::read(path).await {
        Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => Ok(LinkMap::new()),
        Ok(raw) => {
            serde_json::from_slice(&raw).map_err(|e| storage_error("parse link file", path, &e))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LinkMap::new()),
        Err(e) => Err(storage_error("read link file", path, &e)),
    }
}

fn storage_error(action: &str, path: &Path, e: &dyn std::fmt::Display) -> AppError {
    AppError::internal(
        format!("Failed to {action}"),
        json!({ "path": path.display().to_string(), "reason": e.to_string() }),
    )
}

#[async_trait]
impl LinkRepository for FileLinkRepository {
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let mut snapshot = self.snapshot.write().await;
        self.reload(&mut snapshot).await?;

        if snapshot.links.contains_key(&new_link.short_id) {
            return Err(AppError::conflict(
                "Short id already exists",
                json!({ "short_id": new_link.short_id }),
            ));
        }

        let link = ShortLink::from_new(new_link, Utc::now());
        snapshot.links.insert(link.short_id.clone(), link.clone());

        if let Err(e) = self.persist(&mut snapshot).await {
            snapshot.links.remove(&link.short_id);
            return Err(e);
        }

        Ok(link)
    }

    async fn find_by_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.read().await?.links.get(short_id).cloned())
    }

    async fn exists(&self, short_id: &str) -> Result<bool, AppError> {
        Ok(self.read().await?.links.contains_key(short_id))
    }

    async fn list(&self) -> Result<Vec<ShortLink>, AppError> {
        let mut all: Vec<ShortLink> = self.read().await?.links.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn count(&self) -> Result<usize, AppError> {
        Ok(self.read().await?.links.len())
    }

    async fn record_click(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        let mut snapshot = self.snapshot.write().await;
        self.reload(&mut snapshot).await?;

        let Some(link) = snapshot.links.get_mut(short_id) else {
            return Ok(None);
        };
        link.clicks += 1;
        let clicked = link.clone();

        if let Err(e) = self.persist(&mut snapshot).await {
            if let Some(link) = snapshot.links.get_mut(short_id) {
                link.clicks -= 1;
            }
            return Err(e);
        }

        Ok(Some(clicked))
    }

    async fn delete(&self, short_id: &str) -> Result<bool, AppError> {
        let mut snapshot = self.snapshot.write().await;
        self.reload(&mut snapshot).await?;

        let Some(removed) = snapshot.links.remove(short_id) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&mut snapshot).await {
            snapshot.links.insert(removed.short_id.clone(), removed);
            return Err(e);
        }

        Ok(true)
    }

    async fn health_check(&self) -> bool {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::metadata(dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}
