//! Blog repository implementation

use crate::error::Result;
use crate::models::{Blog, BlogId};
use rusqlite::{params, Connection, Row};

const BLOG_COLUMNS: &str = "id, title, slug, author_id, parent_id, content, description, \
     cover_image_url, icon, tags, likes, views, comments, shares, \
     is_pinned, is_featured, is_published, is_archived, is_preview, is_on_explore, \
     published_at, created_at, updated_at, deleted_at, synced_at";

/// Trait for blog storage operations
///
/// Tombstones (`deleted_at > 0`) are excluded from user-facing listings at
/// this layer by convention; `list_all` and `list_tombstones` see them so
/// the sync manager can reconcile deletions.
pub trait BlogRepository {
    /// Get a blog by ID (tombstones included)
    fn get(&self, id: &BlogId) -> Result<Option<Blog>>;

    /// Insert-or-replace a blog, keyed by ID
    fn put(&self, blog: &Blog) -> Result<()>;

    /// Physically remove a row; only valid once both replicas agree on deletion
    fn delete_hard(&self, id: &BlogId) -> Result<()>;

    /// Every row in the store, tombstones included, oldest-created first
    fn list_all(&self) -> Result<Vec<Blog>>;

    /// Direct children of the given blog
    fn list_children(&self, parent_id: &BlogId) -> Result<Vec<Blog>>;

    /// Archived (trashed) blogs, most recently touched first
    fn list_archived(&self) -> Result<Vec<Blog>>;

    /// Soft-deleted rows awaiting purge
    fn list_tombstones(&self) -> Result<Vec<Blog>>;

    /// Sidebar listing: non-archived blogs under the given parent,
    /// pinned first, then oldest-created first
    fn list_sidebar(&self, parent_id: Option<&BlogId>) -> Result<Vec<Blog>>;

    /// Set `synced_at` on every row in one statement
    fn stamp_synced(&self, timestamp: i64) -> Result<()>;
}

/// `SQLite` implementation of `BlogRepository`
pub struct SqliteBlogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteBlogRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a blog from a database row
    fn parse_blog(row: &Row<'_>) -> rusqlite::Result<Blog> {
        let id: String = row.get(0)?;
        let parent_id: Option<String> = row.get(4)?;
        let tags: String = row.get(9)?;
        Ok(Blog {
            // the id is the replica join key; a malformed one is corrupt
            // data and must never be replaced by a fresh id
            id: id.parse().map_err(|error: uuid::Error| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })?,
            title: row.get(1)?,
            slug: row.get(2)?,
            author_id: row.get(3)?,
            // empty string and NULL both mean "no parent" in older rows
            parent_id: parent_id
                .filter(|p| !p.is_empty())
                .and_then(|p| p.parse().ok()),
            content: row.get(5)?,
            description: row.get(6)?,
            cover_image_url: row.get(7)?,
            icon: row.get(8)?,
            tags: serde_json::from_str(&tags).unwrap_or_default(),
            likes: row.get(10)?,
            views: row.get(11)?,
            comments: row.get(12)?,
            shares: row.get(13)?,
            is_pinned: row.get::<_, i32>(14)? != 0,
            is_featured: row.get::<_, i32>(15)? != 0,
            is_published: row.get::<_, i32>(16)? != 0,
            is_archived: row.get::<_, i32>(17)? != 0,
            is_preview: row.get::<_, i32>(18)? != 0,
            is_on_explore: row.get::<_, i32>(19)? != 0,
            published_at: row.get(20)?,
            created_at: row.get(21)?,
            updated_at: row.get(22)?,
            deleted_at: row.get(23)?,
            synced_at: row.get(24)?,
        })
    }

    fn query_blogs(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Blog>> {
        let mut stmt = self.conn.prepare(sql)?;
        let blogs = stmt
            .query_map(params, Self::parse_blog)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(blogs)
    }
}

impl BlogRepository for SqliteBlogRepository<'_> {
    fn get(&self, id: &BlogId) -> Result<Option<Blog>> {
        let result = self.conn.query_row(
            &format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = ?"),
            params![id.as_str()],
            Self::parse_blog,
        );

        match result {
            Ok(blog) => Ok(Some(blog)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, blog: &Blog) -> Result<()> {
        let tags = serde_json::to_string(&blog.tags)?;
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO blogs ({BLOG_COLUMNS})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                blog.id.as_str(),
                blog.title,
                blog.slug,
                blog.author_id,
                blog.parent_id.map(|p| p.as_str()),
                blog.content,
                blog.description,
                blog.cover_image_url,
                blog.icon,
                tags,
                blog.likes,
                blog.views,
                blog.comments,
                blog.shares,
                i32::from(blog.is_pinned),
                i32::from(blog.is_featured),
                i32::from(blog.is_published),
                i32::from(blog.is_archived),
                i32::from(blog.is_preview),
                i32::from(blog.is_on_explore),
                blog.published_at,
                blog.created_at,
                blog.updated_at,
                blog.deleted_at,
                blog.synced_at,
            ],
        )?;
        Ok(())
    }

    fn delete_hard(&self, id: &BlogId) -> Result<()> {
        self.conn
            .execute("DELETE FROM blogs WHERE id = ?", params![id.as_str()])?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Blog>> {
        self.query_blogs(
            &format!("SELECT {BLOG_COLUMNS} FROM blogs ORDER BY created_at ASC"),
            [],
        )
    }

    fn list_children(&self, parent_id: &BlogId) -> Result<Vec<Blog>> {
        self.query_blogs(
            &format!(
                "SELECT {BLOG_COLUMNS} FROM blogs
                 WHERE parent_id = ?
                 ORDER BY created_at ASC"
            ),
            params![parent_id.as_str()],
        )
    }

    fn list_archived(&self) -> Result<Vec<Blog>> {
        self.query_blogs(
            &format!(
                "SELECT {BLOG_COLUMNS} FROM blogs
                 WHERE is_archived = 1 AND deleted_at = 0
                 ORDER BY updated_at DESC"
            ),
            [],
        )
    }

    fn list_tombstones(&self) -> Result<Vec<Blog>> {
        self.query_blogs(
            &format!(
                "SELECT {BLOG_COLUMNS} FROM blogs
                 WHERE deleted_at > 0
                 ORDER BY deleted_at ASC"
            ),
            [],
        )
    }

    fn list_sidebar(&self, parent_id: Option<&BlogId>) -> Result<Vec<Blog>> {
        self.query_blogs(
            &format!(
                "SELECT {BLOG_COLUMNS} FROM blogs
                 WHERE parent_id IS ? AND is_archived = 0 AND deleted_at = 0
                 ORDER BY is_pinned DESC, created_at ASC"
            ),
            params![parent_id.map(BlogId::as_str)],
        )
    }

    fn stamp_synced(&self, timestamp: i64) -> Result<()> {
        self.conn
            .execute("UPDATE blogs SET synced_at = ?", params![timestamp])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::Blog;
    use pretty_assertions::assert_eq;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_put_and_get_roundtrip() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        let mut blog = Blog::new("Hello", "author-1", None);
        blog.tags = vec!["rust".to_string(), "notes".to_string()];
        blog.content = Some("body".to_string());
        repo.put(&blog).unwrap();

        let fetched = repo.get(&blog.id).unwrap().unwrap();
        assert_eq!(fetched, blog);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());
        assert!(repo.get(&BlogId::new()).unwrap().is_none());
    }

    #[test]
    fn test_put_is_upsert() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        let mut blog = Blog::new("First", "author-1", None);
        repo.put(&blog).unwrap();
        blog.title = "Second".to_string();
        repo.put(&blog).unwrap();

        let fetched = repo.get(&blog.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Second");
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_hard_removes_row() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        let blog = Blog::new("Gone", "author-1", None);
        repo.put(&blog).unwrap();
        repo.delete_hard(&blog.id).unwrap();
        assert!(repo.get(&blog.id).unwrap().is_none());
    }

    #[test]
    fn test_list_children() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        let root = Blog::new("Root", "author-1", None);
        let child_a = Blog::new("A", "author-1", Some(root.id));
        let child_b = Blog::new("B", "author-1", Some(root.id));
        let other = Blog::new("Other root", "author-1", None);
        for blog in [&root, &child_a, &child_b, &other] {
            repo.put(blog).unwrap();
        }

        let children = repo.list_children(&root.id).unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.parent_id == Some(root.id)));
    }

    #[test]
    fn test_list_sidebar_filters_and_orders() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        let mut first = Blog::new("first", "author-1", None);
        first.created_at = 100;
        let mut pinned = Blog::new("pinned", "author-1", None);
        pinned.is_pinned = true;
        pinned.created_at = 200;
        let mut archived = Blog::new("archived", "author-1", None);
        archived.is_archived = true;
        let mut deleted = Blog::new("deleted", "author-1", None);
        deleted.deleted_at = 1;
        for blog in [&first, &pinned, &archived, &deleted] {
            repo.put(blog).unwrap();
        }

        let sidebar = repo.list_sidebar(None).unwrap();
        let titles: Vec<_> = sidebar.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["pinned", "first"]);
    }

    #[test]
    fn test_list_archived_excludes_tombstones() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        let mut trashed = Blog::new("trashed", "author-1", None);
        trashed.is_archived = true;
        let mut purged = Blog::new("purged", "author-1", None);
        purged.is_archived = true;
        purged.deleted_at = 42;
        repo.put(&trashed).unwrap();
        repo.put(&purged).unwrap();

        let archived = repo.list_archived().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].title, "trashed");

        let tombstones = repo.list_tombstones().unwrap();
        assert_eq!(tombstones.len(), 1);
        assert_eq!(tombstones[0].title, "purged");
    }

    #[test]
    fn test_stamp_synced_updates_every_row() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        repo.put(&Blog::new("one", "author-1", None)).unwrap();
        repo.put(&Blog::new("two", "author-1", None)).unwrap();
        repo.stamp_synced(4242).unwrap();

        let blogs = repo.list_all().unwrap();
        assert!(blogs.iter().all(|b| b.synced_at == 4242));
    }

    #[test]
    fn test_malformed_id_is_an_error() {
        let db = setup();
        db.connection()
            .execute(
                "INSERT INTO blogs (id, title, slug, author_id, created_at, updated_at)
                 VALUES ('not-a-uuid', 't', 's', 'a', 1, 1)",
                [],
            )
            .unwrap();

        let repo = SqliteBlogRepository::new(db.connection());
        assert!(repo.list_all().is_err());
    }

    #[test]
    fn test_parse_normalizes_empty_parent() {
        let db = setup();
        let repo = SqliteBlogRepository::new(db.connection());

        let blog = Blog::new("Legacy row", "author-1", None);
        repo.put(&blog).unwrap();
        // Older schema revisions stored "" instead of NULL
        db.connection()
            .execute(
                "UPDATE blogs SET parent_id = '' WHERE id = ?",
                params![blog.id.as_str()],
            )
            .unwrap();

        let fetched = repo.get(&blog.id).unwrap().unwrap();
        assert_eq!(fetched.parent_id, None);
    }
}
