//! Shared blog store service used across clients.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::db::{
    BlogRepository, Database, SettingsRepository, SqliteBlogRepository, SqliteSettingsRepository,
};
use crate::error::Result;
use crate::models::{Blog, BlogId};

/// Thread-safe, clonable service for local blog persistence.
///
/// All reads and writes go through one connection behind an async mutex;
/// writes bump a revision counter that UI layers can watch to re-run their
/// queries (live result sets without the store knowing about views).
#[derive(Clone)]
pub struct BlogStore {
    db: Arc<Mutex<Database>>,
    revision: Arc<watch::Sender<u64>>,
}

impl BlogStore {
    /// Open a store at the given filesystem path.
    pub fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db = Database::open(db_path.into())?;
        Ok(Self::from_database(db))
    }

    /// Open an in-memory store (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::from_database(db))
    }

    fn from_database(db: Database) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            db: Arc::new(Mutex::new(db)),
            revision: Arc::new(revision),
        }
    }

    /// Watch for committed writes; the value is a monotonically increasing
    /// revision number.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Fetch a blog by id (tombstones included).
    pub async fn get(&self, id: &BlogId) -> Result<Option<Blog>> {
        let db = self.db.lock().await;
        SqliteBlogRepository::new(db.connection()).get(id)
    }

    /// Insert-or-replace a blog.
    pub async fn put(&self, blog: &Blog) -> Result<()> {
        {
            let db = self.db.lock().await;
            SqliteBlogRepository::new(db.connection()).put(blog)?;
        }
        self.notify();
        Ok(())
    }

    /// Physically remove a row after tombstone convergence.
    pub async fn delete_hard(&self, id: &BlogId) -> Result<()> {
        {
            let db = self.db.lock().await;
            SqliteBlogRepository::new(db.connection()).delete_hard(id)?;
        }
        self.notify();
        Ok(())
    }

    /// Every row in the store, tombstones included.
    pub async fn list_all(&self) -> Result<Vec<Blog>> {
        let db = self.db.lock().await;
        SqliteBlogRepository::new(db.connection()).list_all()
    }

    /// Direct children of the given blog.
    pub async fn list_children(&self, parent_id: &BlogId) -> Result<Vec<Blog>> {
        let db = self.db.lock().await;
        SqliteBlogRepository::new(db.connection()).list_children(parent_id)
    }

    /// Archived (trashed) blogs, most recently touched first.
    pub async fn list_archived(&self) -> Result<Vec<Blog>> {
        let db = self.db.lock().await;
        SqliteBlogRepository::new(db.connection()).list_archived()
    }

    /// Soft-deleted rows awaiting purge.
    pub async fn list_tombstones(&self) -> Result<Vec<Blog>> {
        let db = self.db.lock().await;
        SqliteBlogRepository::new(db.connection()).list_tombstones()
    }

    /// Sidebar listing for the given parent.
    pub async fn list_sidebar(&self, parent_id: Option<&BlogId>) -> Result<Vec<Blog>> {
        let db = self.db.lock().await;
        SqliteBlogRepository::new(db.connection()).list_sidebar(parent_id)
    }

    /// Record the reconciliation time on every row; one write, one
    /// revision bump.
    pub async fn stamp_synced(&self, timestamp: i64) -> Result<()> {
        {
            let db = self.db.lock().await;
            SqliteBlogRepository::new(db.connection()).stamp_synced(timestamp)?;
        }
        self.notify();
        Ok(())
    }

    /// Timestamp of the last successful sync.
    pub async fn last_synced_at(&self) -> Result<Option<i64>> {
        let db = self.db.lock().await;
        SqliteSettingsRepository::new(db.connection()).last_synced_at()
    }

    /// Record the last successful sync timestamp.
    pub async fn set_last_synced_at(&self, timestamp: i64) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSettingsRepository::new(db.connection()).set_last_synced_at(timestamp)
    }
}
