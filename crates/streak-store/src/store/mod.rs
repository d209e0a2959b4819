//! File-backed state store.
//!
//! The whole snapshot lives in memory behind one `tokio::sync::Mutex`; every
//! mutation runs inside [`StateStore::with_lock`] and is committed to disk
//! (temp file, fsync, rename) before the lock is released.


use crate::snapshot::Snapshot;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use streak_core::{error::StreakError, message::ChatId, streak::ChatRecord};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

struct Inner {
    snapshot: Snapshot,
    /// Set when the last commit failed; the next section or flush rewrites.
    dirty: bool,
}

/// Persistent chat state backed by a single JSON file.
#[derive(Clone)]
pub struct StateStore {
    path: Arc<PathBuf>,
    inner: Arc<Mutex<Inner>>,
}

impl StateStore {
    /// Open the store at `path`, loading the last committed snapshot.
    ///
    /// A missing file starts empty. An unreadable or unparsable file is moved
    /// aside to `<file>.corrupt-<timestamp>` and the store starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let snapshot = match read_snapshot(&path).await {
            Ok(Some(snapshot)) => {
                info!(
                    "State store loaded {} chats from {}",
                    snapshot.chats.len(),
                    path.display()
                );
                snapshot
            }
            Ok(None) => {
                info!("State store not found at {}, starting empty", path.display());
                Snapshot::default()
            }
            Err(e) => {
                warn!("{e}; starting with an empty state");
                quarantine(&path).await;
                Snapshot::default()
            }
        };

        Self {
            path: Arc::new(path),
            inner: Arc::new(Mutex::new(Inner {
                snapshot,
                dirty: false,
            })),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the current snapshot.
    pub async fn load(&self) -> Snapshot {
        self.inner.lock().await.snapshot.clone()
    }

    /// A copy of one chat's record, if tracked.
    pub async fn get(&self, chat_id: ChatId) -> Option<ChatRecord> {
        self.inner.lock().await.snapshot.chats.get(&chat_id).cloned()
    }

    /// Run `f` with exclusive access to the snapshot, then commit.
    ///
    /// No two sections run concurrently. The commit is skipped when `f` left
    /// the snapshot unchanged and nothing is pending from an earlier failure.
    /// If the commit fails the mutation stays in memory, the store is marked
    /// dirty, and the error is returned; the next commit rewrites everything.
    pub async fn with_lock<F, R>(&self, f: F) -> Result<R, StreakError>
    where
        F: FnOnce(&mut Snapshot) -> R,
    {
        let mut guard = self.inner.lock().await;
        let before = guard.snapshot.clone();
        let result = f(&mut guard.snapshot);

        if guard.snapshot == before && !guard.dirty {
            return Ok(result);
        }

        match write_atomic(&self.path, &guard.snapshot).await {
            Ok(()) => {
                guard.dirty = false;
                Ok(result)
            }
            Err(e) => {
                guard.dirty = true;
                error!("state store commit failed: {e}");
                Err(e)
            }
        }
    }

    /// Retry a failed commit. Returns `true` if a write happened.
    pub async fn flush(&self) -> Result<bool, StreakError> {
        let mut guard = self.inner.lock().await;
        if !guard.dirty {
            return Ok(false);
        }
        write_atomic(&self.path, &guard.snapshot).await?;
        guard.dirty = false;
        info!("state store: pending changes flushed");
        Ok(true)
    }

    /// Whether a commit is pending after a failure.
    pub async fn is_dirty(&self) -> bool {
        self.inner.lock().await.dirty
    }
}

/// Read and parse the snapshot. `Ok(None)` when the file does not exist.
async fn read_snapshot(path: &Path) -> Result<Option<Snapshot>, StreakError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StreakError::StoreCorrupt(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };

    serde_json::from_str(&content).map(Some).map_err(|e| {
        StreakError::StoreCorrupt(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Move an unreadable snapshot out of the way so the next commit cannot
/// destroy it.
async fn quarantine(path: &Path) {
    if !path.exists() {
        return;
    }
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
    let mut target = path.as_os_str().to_owned();
    target.push(format!(".corrupt-{stamp}"));
    let target = PathBuf::from(target);
    match tokio::fs::rename(path, &target).await {
        Ok(()) => warn!("moved unreadable state to {}", target.display()),
        Err(e) => warn!("failed to move unreadable state aside: {e}"),
    }
}

/// Write the snapshot to a temp file beside `path`, fsync it, then rename
/// over `path` so readers never observe a partial write.
async fn write_atomic(path: &Path, snapshot: &Snapshot) -> Result<(), StreakError> {
    let json = serde_json::to_vec_pretty(snapshot)?;

    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(parent).await.map_err(|e| {
        StreakError::Store(format!("failed to create {}: {e}", parent.display()))
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("state.json");
    let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    let written = async {
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        tokio::fs::rename(&temp_path, path).await?;
        Ok::<(), std::io::Error>(())
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StreakError::Store(format!(
            "failed to commit {}: {e}",
            path.display()
        )));
    }

    debug!("state store committed {} chats", snapshot.chats.len());
    Ok(())
}
