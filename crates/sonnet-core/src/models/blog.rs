//! Blog model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::util::now_ms;

/// Title used when a blog is created without one.
pub const DEFAULT_TITLE: &str = "New Blog";

/// A unique identifier for a blog, using UUID v7 (time-sortable)
///
/// Generated client-side at creation and never regenerated — it is the join
/// key for reconciliation across replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlogId(Uuid);

impl BlogId {
    /// Create a new unique blog ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for BlogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlogId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A blog record — the unit of content and sync.
///
/// Blogs form a forest via `parent_id` (multiple roots, each node at most
/// one parent). All timestamps are Unix epoch milliseconds; `published_at`,
/// `deleted_at`, and `synced_at` use `0` for "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    /// Unique identifier, immutable
    pub id: BlogId,
    pub title: String,
    /// URL slug, set to the id string at creation
    pub slug: String,
    /// Owner identity, immutable after creation
    pub author_id: String,
    /// Parent blog, `None` for roots
    pub parent_id: Option<BlogId>,

    pub content: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub icon: Option<String>,
    pub tags: Vec<String>,

    pub likes: i64,
    pub views: i64,
    pub comments: i64,
    pub shares: i64,

    pub is_pinned: bool,
    pub is_featured: bool,
    pub is_published: bool,
    pub is_archived: bool,
    /// Read-only / locked mode
    pub is_preview: bool,
    /// Visible in the public discovery feed
    pub is_on_explore: bool,

    pub published_at: i64,
    pub created_at: i64,
    /// Bumped on every mutation; the sole conflict-resolution signal
    pub updated_at: i64,
    /// Soft-delete tombstone marker; `> 0` means deleted at that time
    pub deleted_at: i64,
    /// Last successful reconciliation time, local-only
    pub synced_at: i64,
}

impl Blog {
    /// Create a new blog with defaults filled in.
    ///
    /// An empty or whitespace-only title falls back to [`DEFAULT_TITLE`].
    #[must_use]
    pub fn new(title: &str, author_id: &str, parent_id: Option<BlogId>) -> Self {
        let id = BlogId::new();
        let now = now_ms();
        let title = title.trim();
        Self {
            id,
            title: if title.is_empty() {
                DEFAULT_TITLE.to_string()
            } else {
                title.to_string()
            },
            slug: id.as_str(),
            author_id: author_id.to_string(),
            parent_id,
            content: None,
            description: None,
            cover_image_url: None,
            icon: None,
            tags: Vec::new(),
            likes: 0,
            views: 0,
            comments: 0,
            shares: 0,
            is_pinned: false,
            is_featured: false,
            is_published: false,
            is_archived: false,
            is_preview: false,
            is_on_explore: false,
            published_at: 0,
            created_at: now,
            updated_at: now,
            deleted_at: 0,
            synced_at: 0,
        }
    }

    /// Whether this record is a soft-delete tombstone.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at > 0
    }

    /// Apply a partial update, leaving untouched fields as they were.
    ///
    /// Does not bump `updated_at` — callers own the timestamp.
    pub fn apply_patch(&mut self, patch: BlogPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(cover_image_url) = patch.cover_image_url {
            self.cover_image_url = cover_image_url;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(is_featured) = patch.is_featured {
            self.is_featured = is_featured;
        }
        if let Some(is_on_explore) = patch.is_on_explore {
            self.is_on_explore = is_on_explore;
        }
    }
}

/// Field-enumerated partial update for [`Blog`].
///
/// Every patchable field is listed explicitly; `Some(None)` on an optional
/// field clears it. Lifecycle flags (`is_archived`, `is_published`, pin,
/// preview, tombstone) are deliberately absent — those transitions go
/// through their dedicated operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub parent_id: Option<Option<BlogId>>,
    pub content: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub cover_image_url: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_on_explore: Option<bool>,
}

impl BlogPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(Some(content.into()));
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    #[must_use]
    pub fn cover_image_url(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = Some(Some(url.into()));
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(Some(icon.into()));
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub const fn parent(mut self, parent_id: Option<BlogId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_id_unique() {
        let id1 = BlogId::new();
        let id2 = BlogId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_blog_id_parse() {
        let id = BlogId::new();
        let parsed: BlogId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_blog_new_defaults() {
        let blog = Blog::new("Hello", "author-1", None);
        assert_eq!(blog.title, "Hello");
        assert_eq!(blog.author_id, "author-1");
        assert_eq!(blog.slug, blog.id.as_str());
        assert!(blog.parent_id.is_none());
        assert!(!blog.is_archived);
        assert!(!blog.is_deleted());
        assert!(blog.created_at > 0);
        assert_eq!(blog.created_at, blog.updated_at);
        assert_eq!(blog.deleted_at, 0);
        assert_eq!(blog.synced_at, 0);
    }

    #[test]
    fn test_blog_new_empty_title_falls_back() {
        let blog = Blog::new("   ", "author-1", None);
        assert_eq!(blog.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_apply_patch_merges_fields() {
        let mut blog = Blog::new("Original", "author-1", None);
        blog.apply_patch(
            BlogPatch::default()
                .title("Renamed")
                .content("body")
                .tags(vec!["rust".to_string()]),
        );
        assert_eq!(blog.title, "Renamed");
        assert_eq!(blog.content.as_deref(), Some("body"));
        assert_eq!(blog.tags, vec!["rust".to_string()]);
        // untouched fields keep their values
        assert!(blog.description.is_none());
    }

    #[test]
    fn test_apply_patch_clears_optional_field() {
        let mut blog = Blog::new("Has cover", "author-1", None);
        blog.cover_image_url = Some("https://img.example/1.png".to_string());

        let mut patch = BlogPatch::default();
        patch.cover_image_url = Some(None);
        blog.apply_patch(patch);
        assert!(blog.cover_image_url.is_none());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(BlogPatch::default().is_empty());
        assert!(!BlogPatch::default().title("x").is_empty());
    }
}
