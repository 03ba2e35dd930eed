//! In-memory remote mirror.
//!
//! Stands in for the hosted rows API in tests and offline sessions. Failure
//! injection mimics a remote outage: reads and/or writes return
//! `RemoteUnavailable` without touching the held rows.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::models::{Blog, BlogId};

use super::RemoteMirror;

#[derive(Clone, Default)]
pub struct MemoryRemote {
    rows: Arc<Mutex<HashMap<BlogId, Blog>>>,
    upsert_log: Arc<Mutex<Vec<BlogId>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing the mirror interface.
    pub fn seed(&self, blog: Blog) {
        self.rows.lock().unwrap().insert(blog.id, blog);
    }

    /// Snapshot of a single row.
    #[must_use]
    pub fn row(&self, id: &BlogId) -> Option<Blog> {
        self.rows.lock().unwrap().get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Order in which rows were upserted, for write-ordering assertions.
    #[must_use]
    pub fn upsert_order(&self) -> Vec<BlogId> {
        self.upsert_log.lock().unwrap().clone()
    }

    /// Make fetches fail with `RemoteUnavailable`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make upserts and deletes fail with `RemoteUnavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl RemoteMirror for MemoryRemote {
    async fn fetch_all(&self, author_id: &str) -> Result<Vec<Blog>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::RemoteUnavailable("simulated outage".to_string()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|blog| blog.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn upsert(&self, blog: &Blog) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::RemoteUnavailable("simulated outage".to_string()));
        }
        self.upsert_log.lock().unwrap().push(blog.id);
        self.rows.lock().unwrap().insert(blog.id, blog.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: &BlogId) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::RemoteUnavailable("simulated outage".to_string()));
        }
        self.rows.lock().unwrap().remove(id);
        Ok(())
    }
}
