//! sonnet-core - Core library for Sonnet
//!
//! This crate contains the shared models, local store, lifecycle operations,
//! and the offline-first sync engine used by all Sonnet clients. Writes land
//! locally first; a background scheduler reconciles the local store with the
//! hosted replica using last-write-wins timestamps and soft-delete
//! tombstones.

pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod remote;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use lifecycle::BlogActions;
pub use models::{Blog, BlogId, BlogPatch};
pub use services::BlogStore;
pub use state::SyncState;
pub use sync::{AutoSync, SyncManager};
