//! Settings repository implementation
//!
//! Local-only scalar state kept outside the blogs table, currently just the
//! last successful sync timestamp.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};

const LAST_SYNCED_AT: &str = "last_synced_at";

/// Trait for settings storage operations
pub trait SettingsRepository {
    /// Timestamp (ms) of the last successful sync, `None` if never synced
    fn last_synced_at(&self) -> Result<Option<i64>>;

    /// Record the last successful sync timestamp
    fn set_last_synced_at(&self, timestamp: i64) -> Result<()>;
}

/// `SQLite` implementation of `SettingsRepository`
pub struct SqliteSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn last_synced_at(&self) -> Result<Option<i64>> {
        Ok(self
            .get_setting(LAST_SYNCED_AT)?
            .and_then(|value| value.parse().ok()))
    }

    fn set_last_synced_at(&self, timestamp: i64) -> Result<()> {
        self.set_setting(LAST_SYNCED_AT, &timestamp.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_unset_returns_none() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteSettingsRepository::new(db.connection());
        assert_eq!(repo.last_synced_at().unwrap(), None);
    }

    #[test]
    fn test_set_and_load() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteSettingsRepository::new(db.connection());

        repo.set_last_synced_at(1_700_000_000_000).unwrap();
        assert_eq!(repo.last_synced_at().unwrap(), Some(1_700_000_000_000));

        repo.set_last_synced_at(1_700_000_500_000).unwrap();
        assert_eq!(repo.last_synced_at().unwrap(), Some(1_700_000_500_000));
    }
}
