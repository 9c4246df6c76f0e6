//! Change-aware persistence scheduling.
//!
//! UI edits fire on every keystroke; debouncing plus content hashing keeps
//! the durable store at one write per semantically distinct state.

use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use salarium_common::time::{constants, DurationExt};
use salarium_common::{Budget, CompensationRecord};

use crate::error::StoreResult;
use crate::hash::content_hash;
use crate::kv::DurableStore;
use crate::snapshot::SnapshotState;

/// Durable key holding the most recent snapshot.
pub const LATEST_SNAPSHOT_KEY: &str = "snapshot/latest";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Quiet period before a scheduled write fires.
    pub delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            delay: constants::debounce_delay(),
        }
    }
}

/// Outcome of a flush attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushOutcome {
    /// A new snapshot was written.
    Written(SnapshotState),
    /// The state hash matched the last committed one; write suppressed.
    Unchanged,
}

/// Debounces persistence requests and suppresses writes whose content hash
/// matches the last committed state.
///
/// Each `schedule` call cancels any pending timer and starts a new one:
/// last-write-wins coalescing, not queuing. The scheduler exclusively owns
/// the last-committed hash.
pub struct ChangeTrackingScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    store: Arc<dyn DurableStore>,
    config: SchedulerConfig,
    last_committed_hash: Mutex<Option<String>>,
    pending: Mutex<PendingWrite>,
}

/// The pending debounced write, if any.
///
/// The generation ties a timer task to the `schedule` call that spawned
/// it; a superseded task gives up at wake instead of writing. Only a task
/// still in the slot is ever aborted, and a task leaves the slot before it
/// starts flushing, so an abort can land during the sleep but never
/// mid-write.
#[derive(Default)]
struct PendingWrite {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl ChangeTrackingScheduler {
    /// Create a scheduler with the default debounce delay.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self::with_config(store, SchedulerConfig::default())
    }

    /// Create a scheduler with custom configuration.
    pub fn with_config(store: Arc<dyn DurableStore>, config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                config,
                last_committed_hash: Mutex::new(None),
                pending: Mutex::new(PendingWrite::default()),
            }),
        }
    }

    /// Request a debounced write of the given state.
    ///
    /// Only the most recent call within the delay window results in a
    /// write. Errors on the timer path are logged, not propagated; the
    /// in-memory state stays authoritative.
    pub fn schedule(&self, records: Vec<CompensationRecord>, budget: Budget) {
        let inner = Arc::clone(&self.inner);
        let delay = self.inner.config.delay.as_std();

        let generation = {
            let mut pending = self.inner.pending.lock();
            pending.generation += 1;
            if let Some(previous) = pending.handle.take() {
                previous.abort();
                debug!("Rescheduled pending snapshot write");
            }
            pending.generation
        };

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Leave the pending slot before writing; a flush in progress is
            // never aborted.
            {
                let mut pending = inner.pending.lock();
                if pending.generation != generation {
                    return;
                }
                pending.handle = None;
            }

            if let Err(e) = inner.flush(records, budget).await {
                warn!(error = %e, "Debounced snapshot write failed");
            }
        });

        let mut pending = self.inner.pending.lock();
        if pending.generation == generation {
            pending.handle = Some(handle);
        }
    }

    /// Write the given state immediately, bypassing the debounce window.
    ///
    /// Any pending timer is cancelled; the flush supersedes it.
    pub async fn flush_now(
        &self,
        records: Vec<CompensationRecord>,
        budget: Budget,
    ) -> StoreResult<FlushOutcome> {
        self.cancel_pending();
        self.inner.flush(records, budget).await
    }

    /// Cancel any pending debounced write.
    ///
    /// Cancels cleanly: a timer still in its quiet period never writes,
    /// and a flush that has already started runs to completion rather than
    /// being interrupted between writes.
    pub fn cancel_pending(&self) {
        let mut pending = self.inner.pending.lock();
        pending.generation += 1;
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }
    }

    /// Whether a debounced write is currently pending.
    pub fn has_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// The hash of the last committed snapshot, if any.
    pub fn last_committed_hash(&self) -> Option<String> {
        self.inner.last_committed_hash.lock().clone()
    }
}

impl SchedulerInner {
    async fn flush(
        &self,
        records: Vec<CompensationRecord>,
        budget: Budget,
    ) -> StoreResult<FlushOutcome> {
        let hash = content_hash(&records, &budget);

        let last = self.last_committed_hash.lock().clone();
        if last.as_deref() == Some(hash.as_str()) {
            debug!(hash, "State unchanged, suppressing snapshot write");
            return Ok(FlushOutcome::Unchanged);
        }

        let snapshot = SnapshotState::new(records, budget, hash.clone());
        let value = serde_json::to_value(&snapshot)?;

        self.store
            .put(&format!("snapshot/{}", snapshot.id), value.clone())
            .await?;
        self.store.put(LATEST_SNAPSHOT_KEY, value).await?;

        *self.last_committed_hash.lock() = Some(hash);

        info!(
            snapshot_id = %snapshot.id,
            records = snapshot.records.len(),
            "Snapshot committed"
        );

        Ok(FlushOutcome::Written(snapshot))
    }
}
