//! Two-way reconciliation between the local store and the remote mirror.
//!
//! Stateless between runs: every pass recomputes the full diff and resolves
//! divergence with last-write-wins on `updated_at`. Soft-deletes converge to
//! a hard purge on both sides after one successful pass. A failed step
//! aborts the remainder of the pass; writes already applied stay applied and
//! the next scheduled run picks up from the current state.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::models::{Blog, BlogId};
use crate::remote::RemoteMirror;
use crate::services::BlogStore;
use crate::util::now_ms;

/// Reconciles one user's blog set between the local store and the remote
/// mirror.
#[derive(Clone)]
pub struct SyncManager<R: RemoteMirror> {
    store: BlogStore,
    remote: R,
    author_id: String,
}

impl<R: RemoteMirror> SyncManager<R> {
    pub fn new(store: BlogStore, remote: R, author_id: impl Into<String>) -> Self {
        Self {
            store,
            remote,
            author_id: author_id.into(),
        }
    }

    /// Run one full reconciliation pass.
    pub async fn sync(&self) -> Result<()> {
        let (local, remote) = tokio::join!(
            self.store.list_all(),
            self.remote.fetch_all(&self.author_id)
        );
        let mut local = local?;
        let remote = remote?;

        // Parents before children: the remote side may enforce referential
        // order when a child row names a parent that does not exist yet.
        local.sort_by_key(|blog| blog.parent_id.is_some());

        let remote_by_id: HashMap<BlogId, &Blog> =
            remote.iter().map(|blog| (blog.id, blog)).collect();
        let local_ids: HashSet<BlogId> = local.iter().map(|blog| blog.id).collect();

        let mut pushed = 0_usize;
        let mut pulled = 0_usize;

        for blog in &local {
            match remote_by_id.get(&blog.id) {
                None => {
                    if !blog.is_deleted() {
                        self.remote.upsert(blog).await?;
                        pushed += 1;
                    }
                }
                Some(counterpart) => {
                    self.resolve_conflict(blog, counterpart).await?;
                }
            }
        }

        for blog in &remote {
            if !local_ids.contains(&blog.id) && !blog.is_deleted() {
                self.store.put(blog).await?;
                pulled += 1;
            }
        }

        let purged = self.purge_tombstones(&local, &remote).await?;

        let now = now_ms();
        self.store.stamp_synced(now).await?;
        self.store.set_last_synced_at(now).await?;

        tracing::info!(pushed, pulled, purged, "sync pass complete");
        Ok(())
    }

    /// Dry-run diff: true iff any record exists on one side only or the two
    /// copies disagree on `updated_at`.
    pub async fn needs_sync(&self) -> Result<bool> {
        let (local, remote) = tokio::join!(
            self.store.list_all(),
            self.remote.fetch_all(&self.author_id)
        );
        let local = local?;
        let remote = remote?;

        let remote_by_id: HashMap<BlogId, &Blog> =
            remote.iter().map(|blog| (blog.id, blog)).collect();
        let local_ids: HashSet<BlogId> = local.iter().map(|blog| blog.id).collect();

        for blog in &local {
            match remote_by_id.get(&blog.id) {
                None => return Ok(true),
                Some(counterpart) => {
                    if blog.updated_at != counterpart.updated_at {
                        return Ok(true);
                    }
                }
            }
        }

        Ok(remote.iter().any(|blog| !local_ids.contains(&blog.id)))
    }

    /// Reconcile a single record, for low-latency "save now" triggers.
    pub async fn sync_single_blog(&self, id: BlogId) -> Result<()> {
        let local = self.store.get(&id).await?;
        let remote = self
            .remote
            .fetch_all(&self.author_id)
            .await?
            .into_iter()
            .find(|blog| blog.id == id);

        match (local, remote) {
            (None, None) => return Err(Error::NotFound(id.to_string())),
            (Some(local), None) => {
                if local.is_deleted() {
                    self.store.delete_hard(&id).await?;
                } else {
                    self.remote.upsert(&local).await?;
                }
            }
            (None, Some(remote)) => {
                if !remote.is_deleted() {
                    self.store.put(&remote).await?;
                }
            }
            (Some(local), Some(remote)) => {
                if local.is_deleted() {
                    self.remote.delete_by_id(&id).await?;
                    self.store.delete_hard(&id).await?;
                } else if remote.is_deleted() {
                    self.store.delete_hard(&id).await?;
                } else {
                    self.resolve_conflict(&local, &remote).await?;
                }
            }
        }

        let now = now_ms();
        if let Some(mut survivor) = self.store.get(&id).await? {
            survivor.synced_at = now;
            self.store.put(&survivor).await?;
        }
        self.store.set_last_synced_at(now).await?;
        Ok(())
    }

    /// Last-write-wins on `updated_at`. Tombstoned pairs are left to the
    /// dedicated purge pass. Equal timestamps are a no-op even when content
    /// differs; without a tiebreaker on the wire there is nothing sound to
    /// prefer.
    async fn resolve_conflict(&self, local: &Blog, remote: &Blog) -> Result<()> {
        if local.is_deleted() || remote.is_deleted() {
            return Ok(());
        }
        if local.updated_at > remote.updated_at {
            self.remote.upsert(local).await?;
        } else if remote.updated_at > local.updated_at {
            self.store.put(remote).await?;
        }
        Ok(())
    }

    /// Converge soft-deletes to hard purges on both sides.
    async fn purge_tombstones(&self, local: &[Blog], remote: &[Blog]) -> Result<usize> {
        let remote_ids: HashSet<BlogId> = remote.iter().map(|blog| blog.id).collect();
        let mut purged = 0_usize;

        for blog in local {
            if blog.is_deleted() {
                if remote_ids.contains(&blog.id) {
                    self.remote.delete_by_id(&blog.id).await?;
                }
                self.store.delete_hard(&blog.id).await?;
                purged += 1;
            }
        }

        for blog in remote {
            if blog.is_deleted() {
                self.store.delete_hard(&blog.id).await?;
                purged += 1;
            }
        }

        Ok(purged)
    }
}
