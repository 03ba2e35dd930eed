//! Remote mirror boundary
//!
//! Translates [`Blog`] records to and from the remote row representation and
//! abstracts the network calls the sync manager needs. All transport
//! failures surface as [`Error::RemoteUnavailable`] — transient, never data
//! loss.

mod http;
mod memory;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Blog, BlogId};

pub use http::HttpRemoteMirror;
pub use memory::MemoryRemote;

/// One user's slice of the remote replica.
pub trait RemoteMirror: Send + Sync + 'static {
    /// Fetch every row owned by `author_id`, tombstones included.
    fn fetch_all(&self, author_id: &str) -> impl Future<Output = Result<Vec<Blog>>> + Send;

    /// Insert-or-replace a row keyed by id.
    fn upsert(&self, blog: &Blog) -> impl Future<Output = Result<()>> + Send;

    /// Physically remove a row.
    fn delete_by_id(&self, id: &BlogId) -> impl Future<Output = Result<()>> + Send;
}

/// Wire representation of a blog row.
///
/// The remote schema stores flags as integers and "no parent" as SQL NULL
/// (older local rows used `""`). `synced_at` is local-only and never leaves
/// the device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlogRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub author_id: String,
    pub parent_id: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub is_pinned: i64,
    #[serde(default)]
    pub is_featured: i64,
    #[serde(default)]
    pub is_published: i64,
    #[serde(default)]
    pub is_archived: i64,
    #[serde(default)]
    pub is_preview: i64,
    #[serde(default)]
    pub is_on_explore: i64,
    #[serde(default)]
    pub published_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub deleted_at: i64,
}

impl From<&Blog> for BlogRow {
    fn from(blog: &Blog) -> Self {
        Self {
            id: blog.id.as_str(),
            title: blog.title.clone(),
            slug: blog.slug.clone(),
            author_id: blog.author_id.clone(),
            parent_id: blog.parent_id.map(|p| p.as_str()),
            content: blog.content.clone(),
            description: blog.description.clone(),
            cover_image_url: blog.cover_image_url.clone(),
            icon: blog.icon.clone(),
            tags: blog.tags.clone(),
            likes: blog.likes,
            views: blog.views,
            comments: blog.comments,
            shares: blog.shares,
            is_pinned: i64::from(blog.is_pinned),
            is_featured: i64::from(blog.is_featured),
            is_published: i64::from(blog.is_published),
            is_archived: i64::from(blog.is_archived),
            is_preview: i64::from(blog.is_preview),
            is_on_explore: i64::from(blog.is_on_explore),
            published_at: blog.published_at,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
            deleted_at: blog.deleted_at,
        }
    }
}

impl BlogRow {
    /// Decode into the local model, normalizing legacy empty-string parents.
    ///
    /// `synced_at` is not on the wire; the sync manager stamps it after a
    /// successful pass. A malformed id is corrupt data — the id is the
    /// replica join key and must never be replaced by a fresh one.
    pub fn into_blog(self) -> Result<Blog> {
        let id = self
            .id
            .parse()
            .map_err(|_| Error::InvalidInput(format!("malformed blog id: {}", self.id)))?;
        Ok(Blog {
            id,
            title: self.title,
            slug: self.slug,
            author_id: self.author_id,
            parent_id: self
                .parent_id
                .filter(|p| !p.is_empty())
                .and_then(|p| p.parse().ok()),
            content: self.content,
            description: self.description,
            cover_image_url: self.cover_image_url,
            icon: self.icon,
            tags: self.tags,
            likes: self.likes,
            views: self.views,
            comments: self.comments,
            shares: self.shares,
            is_pinned: self.is_pinned != 0,
            is_featured: self.is_featured != 0,
            is_published: self.is_published != 0,
            is_archived: self.is_archived != 0,
            is_preview: self.is_preview != 0,
            is_on_explore: self.is_on_explore != 0,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            synced_at: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn row_encoding_flags_and_parent() {
        let root = Blog::new("root", "author-1", None);
        let mut child = Blog::new("child", "author-1", Some(root.id));
        child.is_pinned = true;
        child.is_published = true;

        let row = BlogRow::from(&child);
        assert_eq!(row.parent_id, Some(root.id.as_str()));
        assert_eq!(row.is_pinned, 1);
        assert_eq!(row.is_published, 1);
        assert_eq!(row.is_archived, 0);

        let root_row = BlogRow::from(&root);
        assert_eq!(root_row.parent_id, None);
    }

    #[test]
    fn row_decoding_normalizes_empty_parent() {
        let blog = Blog::new("b", "author-1", None);
        let mut row = BlogRow::from(&blog);
        row.parent_id = Some(String::new());

        let decoded = row.into_blog().unwrap();
        assert_eq!(decoded.parent_id, None);
    }

    #[test]
    fn row_with_malformed_id_is_rejected() {
        let blog = Blog::new("b", "author-1", None);
        let mut row = BlogRow::from(&blog);
        row.id = "not-a-uuid".to_string();

        assert!(row.into_blog().is_err());
    }

    #[test]
    fn row_roundtrip_preserves_record() {
        let mut blog = Blog::new("roundtrip", "author-1", None);
        blog.tags = vec!["a".to_string(), "b".to_string()];
        blog.content = Some("text".to_string());
        blog.is_archived = true;
        blog.deleted_at = 77;

        let decoded = BlogRow::from(&blog).into_blog().unwrap();
        // synced_at is local-only and resets on the wire
        blog.synced_at = 0;
        assert_eq!(decoded, blog);
    }

    #[test]
    fn row_deserializes_with_missing_counters() {
        // remote rows from older schema revisions may omit defaulted columns
        let json = r#"{
            "id": "0191b6a0-1111-7000-8000-000000000001",
            "title": "t", "slug": "s", "author_id": "a",
            "parent_id": null,
            "content": null, "description": null,
            "cover_image_url": null, "icon": null,
            "created_at": 1, "updated_at": 2
        }"#;
        let row: BlogRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.likes, 0);
        assert_eq!(row.deleted_at, 0);
    }
}
