//! Database layer for Sonnet

mod connection;
mod migrations;
mod repository;
mod settings_repository;

pub use connection::Database;
pub use repository::{BlogRepository, SqliteBlogRepository};
pub use settings_repository::{SettingsRepository, SqliteSettingsRepository};
