//! Shared cross-platform state types.

/// Unified sync state published by the auto-sync scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Synced,
    Checking,
    Syncing,
    Error,
}
