//! Sync engine: replica reconciliation and the background scheduler.

mod manager;
mod scheduler;

pub use manager::SyncManager;
pub use scheduler::{AutoSync, SyncRunner};
