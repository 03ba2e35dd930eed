//! Debounced, visibility-aware auto-sync loop.
//!
//! All scheduler state lives on the instance so parallel instances (and
//! tests) cannot interfere through shared globals. Single-flight: a trigger
//! arriving while a run is in progress is dropped, not queued; the next
//! periodic tick catches any missed state.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use crate::config::AutoSyncConfig;
use crate::error::Result;
use crate::remote::RemoteMirror;
use crate::state::SyncState;
use crate::sync::SyncManager;
use crate::util::now_ms;

/// What the scheduler drives; implemented by [`SyncManager`].
pub trait SyncRunner: Send + Sync + 'static {
    fn needs_sync(&self) -> impl Future<Output = Result<bool>> + Send;
    fn sync(&self) -> impl Future<Output = Result<()>> + Send;
}

impl<R: RemoteMirror> SyncRunner for SyncManager<R> {
    async fn needs_sync(&self) -> Result<bool> {
        SyncManager::needs_sync(self).await
    }

    async fn sync(&self) -> Result<()> {
        SyncManager::sync(self).await
    }
}

/// Periodic sync driver with debounce, visibility gating, and an in-flight
/// guard.
pub struct AutoSync<M: SyncRunner> {
    inner: Arc<Inner<M>>,
    handle: Option<JoinHandle<()>>,
}

struct Inner<M> {
    runner: M,
    config: AutoSyncConfig,
    in_flight: AtomicBool,
    last_attempt_ms: AtomicI64,
    visible: AtomicBool,
    state: watch::Sender<SyncState>,
    trigger: Notify,
}

impl<M: SyncRunner> AutoSync<M> {
    pub fn new(runner: M, config: AutoSyncConfig) -> Self {
        let (state, _) = watch::channel(SyncState::Synced);
        Self {
            inner: Arc::new(Inner {
                runner,
                config,
                in_flight: AtomicBool::new(false),
                last_attempt_ms: AtomicI64::new(0),
                visible: AtomicBool::new(true),
                state,
                trigger: Notify::new(),
            }),
            handle: None,
        }
    }

    /// Watch the scheduler state for UI indicators.
    pub fn state(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Tell the scheduler whether the app is currently visible to the user.
    /// Ticks while hidden are skipped and rescheduled.
    pub fn set_visible(&self, visible: bool) {
        self.inner.visible.store(visible, Ordering::SeqCst);
    }

    /// Request an out-of-band sync check on the running loop.
    pub fn trigger(&self) {
        self.inner.trigger.notify_one();
    }

    /// Spawn the background loop: one forced sync to establish a fresh
    /// baseline, then the periodic tick. Idempotent while running.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.handle = Some(tokio::spawn(async move {
            inner.run_cycle(true).await;
            tokio::time::sleep(inner.config.startup_delay).await;
            loop {
                tokio::select! {
                    () = tokio::time::sleep(inner.config.interval) => {}
                    () = inner.trigger.notified() => {}
                }
                inner.run_cycle(false).await;
            }
        }));
    }

    /// Stop the background loop. A sync already past the in-flight guard
    /// may be cancelled mid-pass; reconciliation is retried from scratch on
    /// the next start.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Run one cycle inline, without the background loop. `force` bypasses
    /// the debounce and the dirty check, as the on-mount sync does.
    pub async fn run_once(&self, force: bool) {
        self.inner.run_cycle(force).await;
    }
}

impl<M: SyncRunner> Drop for AutoSync<M> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<M: SyncRunner> Inner<M> {
    fn set_state(&self, state: SyncState) {
        self.state.send_replace(state);
    }

    async fn run_cycle(&self, force: bool) {
        if !self.visible.load(Ordering::SeqCst) {
            tracing::trace!("app not visible, skipping sync tick");
            return;
        }

        let elapsed = now_ms() - self.last_attempt_ms.load(Ordering::SeqCst);
        if !force && elapsed < self.config.debounce.as_millis() as i64 {
            tracing::trace!(elapsed_ms = elapsed, "debounced sync tick");
            return;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("sync already in flight, dropping trigger");
            return;
        }

        self.cycle(force).await;
        self.in_flight.store(false, Ordering::SeqCst);
    }

    async fn cycle(&self, force: bool) {
        if !force {
            self.set_state(SyncState::Checking);
            match self.runner.needs_sync().await {
                Ok(true) => {}
                Ok(false) => {
                    self.set_state(SyncState::Synced);
                    return;
                }
                Err(error) => {
                    tracing::warn!(%error, "sync check failed");
                    self.set_state(SyncState::Error);
                    return;
                }
            }
        }

        self.set_state(SyncState::Syncing);
        match self.runner.sync().await {
            Ok(()) => {
                // attempt timestamp moves only on success; failures retry
                // on the next tick without waiting out the debounce
                self.last_attempt_ms.store(now_ms(), Ordering::SeqCst);
                self.set_state(SyncState::Synced);
            }
            Err(error) => {
                tracing::warn!(%error, "sync failed");
                self.set_state(SyncState::Error);
            }
        }
    }
}
