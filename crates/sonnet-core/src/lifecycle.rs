//! Blog lifecycle operations
//!
//! The only code path allowed to mutate the local store on behalf of the UI.
//! Tree-propagating operations (archive, restore, delete) visit the target
//! first, then its descendants pre-order; a malformed parent chain is logged
//! and the branch skipped rather than failing the whole operation.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::{Blog, BlogId, BlogPatch};
use crate::services::BlogStore;
use crate::util::now_ms;

/// Lifecycle operations over the local blog store.
#[derive(Clone)]
pub struct BlogActions {
    store: BlogStore,
}

/// Bump the mutation timestamp, keeping it monotonically non-decreasing.
fn touch(blog: &mut Blog) {
    blog.updated_at = now_ms().max(blog.updated_at);
}

impl BlogActions {
    pub const fn new(store: BlogStore) -> Self {
        Self { store }
    }

    /// The store these actions operate on.
    pub const fn store(&self) -> &BlogStore {
        &self.store
    }

    async fn get_or_not_found(&self, id: BlogId) -> Result<Blog> {
        self.store
            .get(&id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Visit every descendant of `root` pre-order, applying `mutate` and
    /// persisting each. Revisiting an id means the parent chain is cyclic:
    /// the fault is logged and that branch abandoned.
    async fn walk_descendants(&self, root: BlogId, mutate: impl Fn(&mut Blog)) -> Result<()> {
        let mut visited: HashSet<BlogId> = HashSet::from([root]);
        let mut stack: Vec<BlogId> = self
            .store
            .list_children(&root)
            .await?
            .iter()
            .rev()
            .map(|child| child.id)
            .collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                let fault = Error::CycleDetected(id.to_string());
                tracing::warn!(%fault, "skipping branch");
                continue;
            }
            let Some(mut blog) = self.store.get(&id).await? else {
                continue;
            };
            mutate(&mut blog);
            touch(&mut blog);
            self.store.put(&blog).await?;

            for child in self.store.list_children(&id).await?.iter().rev() {
                stack.push(child.id);
            }
        }
        Ok(())
    }

    /// Create a new blog locally and return its id.
    ///
    /// Never touches the remote side; sync picks the record up later.
    pub async fn create(
        &self,
        title: &str,
        author_id: &str,
        parent_id: Option<BlogId>,
    ) -> Result<BlogId> {
        let blog = Blog::new(title, author_id, parent_id);
        self.store.put(&blog).await?;
        tracing::debug!(id = %blog.id, "created blog");
        Ok(blog.id)
    }

    /// Merge the given fields over the existing record.
    pub async fn update(&self, id: BlogId, patch: BlogPatch) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.apply_patch(patch);
        touch(&mut blog);
        self.store.put(&blog).await
    }

    /// Move a blog and its whole subtree to the trash.
    pub async fn archive(&self, id: BlogId) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.is_archived = true;
        touch(&mut blog);
        self.store.put(&blog).await?;

        self.walk_descendants(id, |child| child.is_archived = true)
            .await
    }

    /// Bring a blog and its subtree back from the trash.
    ///
    /// If the blog's parent is itself still archived, the blog is detached
    /// to a root so it does not reappear nested under trash. Descendants
    /// are restored unconditionally.
    pub async fn restore(&self, id: BlogId) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.is_archived = false;
        if let Some(parent_id) = blog.parent_id {
            let parent_archived = self
                .store
                .get(&parent_id)
                .await?
                .is_some_and(|parent| parent.is_archived);
            if parent_archived {
                blog.parent_id = None;
            }
        }
        touch(&mut blog);
        self.store.put(&blog).await?;

        self.walk_descendants(id, |child| child.is_archived = false)
            .await
    }

    /// Restore everything currently in the trash.
    ///
    /// Only the top of each archived subtree goes through [`restore`];
    /// its descendants come back through the walk. Restoring descendants
    /// independently would trip the detach rule and flatten the tree.
    ///
    /// [`restore`]: Self::restore
    pub async fn restore_all(&self) -> Result<()> {
        let archived = self.store.list_archived().await?;
        let archived_ids: HashSet<BlogId> = archived.iter().map(|blog| blog.id).collect();

        for blog in &archived {
            let under_archived = blog
                .parent_id
                .is_some_and(|parent| archived_ids.contains(&parent));
            if !under_archived {
                self.restore(blog.id).await?;
            }
        }

        // a cyclic parent chain has no top; whatever is left gets restored
        // directly, detaching as needed
        for blog in self.store.list_archived().await? {
            let still_archived = self
                .store
                .get(&blog.id)
                .await?
                .is_some_and(|current| current.is_archived);
            if still_archived {
                self.restore(blog.id).await?;
            }
        }
        Ok(())
    }

    /// Soft-delete a blog and its subtree.
    ///
    /// Rows become tombstones (`deleted_at > 0`); the sync manager purges
    /// them from both replicas once the deletion has converged.
    pub async fn delete(&self, id: BlogId) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.deleted_at = now_ms();
        touch(&mut blog);
        self.store.put(&blog).await?;

        self.walk_descendants(id, |child| child.deleted_at = now_ms())
            .await
    }

    /// Empty the trash: soft-delete every archived blog and its subtree.
    pub async fn delete_all(&self) -> Result<()> {
        for blog in self.store.list_archived().await? {
            let still_live = self
                .store
                .get(&blog.id)
                .await?
                .is_some_and(|current| !current.is_deleted());
            if still_live {
                self.delete(blog.id).await?;
            }
        }
        Ok(())
    }

    /// Pin or unpin a blog in the sidebar.
    pub async fn set_pinned(&self, id: BlogId, pinned: bool) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.is_pinned = pinned;
        touch(&mut blog);
        self.store.put(&blog).await
    }

    /// Toggle read-only preview mode.
    pub async fn set_preview(&self, id: BlogId, preview: bool) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.is_preview = preview;
        touch(&mut blog);
        self.store.put(&blog).await
    }

    /// Clear the cover image.
    pub async fn remove_cover_image(&self, id: BlogId) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.cover_image_url = None;
        touch(&mut blog);
        self.store.put(&blog).await
    }

    /// Publish a blog, stamping `published_at`.
    pub async fn publish(&self, id: BlogId) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.is_published = true;
        blog.published_at = now_ms();
        touch(&mut blog);
        self.store.put(&blog).await
    }

    /// Unpublish a blog, clearing `published_at`.
    pub async fn unpublish(&self, id: BlogId) -> Result<()> {
        let mut blog = self.get_or_not_found(id).await?;
        blog.is_published = false;
        blog.published_at = 0;
        touch(&mut blog);
        self.store.put(&blog).await
    }
}
