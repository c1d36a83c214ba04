//! Session directory lifecycle.
//!
//! A session is nothing but a directory at `<workspace>/.sessions/<id>`.
//! There is no in-memory index: existence on disk is the source of truth,
//! so sessions survive nothing beyond the workspace directory itself.

use crate::files::remove_tree;
use crate::Result;
use codejail_core::paths::SESSIONS_DIR;
use codejail_core::{PathResolver, SessionId};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

/// Handle to an existing session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session ID.
    pub id: SessionId,

    /// Canonical session directory.
    pub dir: PathBuf,
}

/// Creates, locates and destroys session directories.
#[derive(Debug, Clone)]
pub struct SessionStore {
    resolver: PathResolver,
}

impl SessionStore {
    /// Create a store over the given workspace resolver.
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// The workspace resolver.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Resolve the directory for `id` without creating it.
    pub fn dir_of(&self, id: &SessionId) -> Result<PathBuf> {
        Ok(self
            .resolver
            .resolve(Path::new(SESSIONS_DIR).join(id.as_str()))?)
    }

    /// Whether the session directory exists.
    pub fn exists(&self, id: &SessionId) -> Result<bool> {
        Ok(self.dir_of(id)?.is_dir())
    }

    /// Ensure a session exists, minting an ID when `raw_id` is absent or empty.
    ///
    /// Idempotent for a given ID.
    pub async fn ensure(&self, raw_id: Option<&str>) -> Result<Session> {
        let id = SessionId::parse_or_generate(raw_id)?;
        self.ensure_id(id).await
    }

    /// Ensure the directory for a validated ID exists.
    pub async fn ensure_id(&self, id: SessionId) -> Result<Session> {
        let sessions_root = self.resolver.resolve(SESSIONS_DIR)?;
        tokio::fs::create_dir_all(&sessions_root).await?;

        let dir = self.dir_of(&id)?;
        let is_dir = tokio::fs::metadata(&dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if is_dir {
            debug!("Reusing session {}", id);
        } else {
            tokio::fs::create_dir_all(&dir).await?;
            info!("Created session {}", id);
        }

        Ok(Session { id, dir })
    }

    /// Recursively delete a session directory.
    ///
    /// Returns whether anything was deleted; a missing session is not an error.
    pub fn destroy(&self, id: &SessionId) -> Result<bool> {
        let dir = self.dir_of(id)?;
        if !dir.exists() {
            debug!("Session {} already absent", id);
            return Ok(false);
        }
        remove_tree(&dir)?;
        info!("Destroyed session {}", id);
        Ok(true)
    }
}

type LockTable = DashMap<SessionId, Arc<Mutex<()>>>;

/// Optional per-session mutual exclusion.
///
/// When disabled, [`acquire`](SessionLocks::acquire) returns immediately and
/// concurrent operations on one session may race on its files. A table
/// entry lives only while some request holds or waits on it.
#[derive(Debug, Default)]
pub struct SessionLocks {
    enabled: bool,
    locks: Arc<LockTable>,
}

impl SessionLocks {
    /// Create a lock table; `enabled = false` makes every acquire a no-op.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Whether locking is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Hold the session's lock until the guard is dropped.
    pub async fn acquire(&self, id: &SessionId) -> Option<SessionGuard> {
        if !self.enabled {
            return None;
        }
        let lock = self
            .locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        Some(SessionGuard {
            id: id.clone(),
            guard: Some(guard),
            locks: self.locks.clone(),
        })
    }

    /// Number of sessions with a live table entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no session has a live table entry.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive hold on one session.
///
/// Dropping it releases the mutex, then removes the table entry unless
/// another request still holds or waits on that mutex.
#[derive(Debug)]
pub struct SessionGuard {
    id: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // The owned guard keeps its own reference to the mutex
        self.guard.take();
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
