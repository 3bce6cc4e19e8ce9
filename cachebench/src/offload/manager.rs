//! Tracked background work.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use cachebench_core::Offload;
use dashmap::DashMap;
use smol_str::SmolStr;
use tokio::sync::Notify;
use tokio::task::AbortHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::policy::{OffloadConfig, TimeoutPolicy};

#[cfg(feature = "metrics")]
use crate::metrics::{OFFLOAD_TASKS_COMPLETED, OFFLOAD_TASKS_SPAWNED, OFFLOAD_TASKS_TIMEOUT};

/// Identifies one piece of background work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffloadKey {
    /// What the task does (`"store_write"`, `"revalidate"`, `"refresh"`).
    pub kind: SmolStr,
    /// Sequence number, unique within one manager.
    pub id: u64,
}

/// Handle to a tracked task.
#[derive(Debug, Clone)]
pub struct OffloadHandle {
    abort: AbortHandle,
}

impl OffloadHandle {
    /// Returns `true` once the task has completed or been aborted.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }

    /// Aborts the task.
    pub fn abort(&self) {
        self.abort.abort();
    }
}

#[derive(Debug)]
struct Shared {
    config: OffloadConfig,
    handles: DashMap<OffloadKey, OffloadHandle>,
    pending: AtomicUsize,
    next_id: AtomicU64,
    idle: Notify,
}

/// Marks a task as settled when dropped, whether it completed, timed out
/// or was aborted.
struct Settled {
    shared: Arc<Shared>,
    key: OffloadKey,
    started: Instant,
}

impl Drop for Settled {
    fn drop(&mut self) {
        self.shared.handles.remove(&self.key);
        #[cfg(feature = "metrics")]
        metrics::counter!(*OFFLOAD_TASKS_COMPLETED, "kind" => self.key.kind.to_string())
            .increment(1);
        debug!(
            kind = %self.key.kind,
            elapsed_ms = self.started.elapsed().as_millis(),
            "background task settled"
        );
        if self.shared.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.idle.notify_waiters();
        }
    }
}

/// Tracks background work registered by intercepted requests.
///
/// Every write-through and background fetch runs as a tokio task owned by
/// the manager. The host calls [`OffloadManager::wait_all`] before tearing
/// the interception context down so no registered work is abandoned
/// mid-flight. Clones share state.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    shared: Arc<Shared>,
}

impl OffloadManager {
    /// Creates a manager applying `config` to every task.
    pub fn new(config: OffloadConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                handles: DashMap::new(),
                pending: AtomicUsize::new(0),
                next_id: AtomicU64::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Creates a manager without task timeouts.
    pub fn with_defaults() -> Self {
        Self::new(OffloadConfig::default())
    }

    /// Starts `task` in the background and returns its key.
    pub fn spawn<F>(&self, kind: impl Into<SmolStr>, task: F) -> OffloadKey
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = OffloadKey {
            kind: kind.into(),
            id: self.shared.next_id.fetch_add(1, Ordering::Relaxed),
        };

        #[cfg(feature = "metrics")]
        metrics::counter!(*OFFLOAD_TASKS_SPAWNED, "kind" => key.kind.to_string()).increment(1);

        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        let settled = Settled {
            shared: self.shared.clone(),
            key: key.clone(),
            started: Instant::now(),
        };
        let span = info_span!("offload_task", kind = %key.kind, id = key.id);
        let guarded = Self::apply_timeout(self.shared.config.timeout, key.clone(), task);
        let join = tokio::spawn(
            async move {
                let _settled = settled;
                guarded.await;
            }
            .instrument(span),
        );

        // A task that already settled has removed nothing; skip the stale entry.
        if !join.is_finished() {
            self.shared.handles.insert(
                key.clone(),
                OffloadHandle {
                    abort: join.abort_handle(),
                },
            );
        }
        self.shared.handles.retain(|_, handle| !handle.is_finished());
        key
    }

    async fn apply_timeout<F>(policy: TimeoutPolicy, key: OffloadKey, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match policy {
            TimeoutPolicy::None => task.await,
            TimeoutPolicy::Cancel(limit) => {
                if tokio::time::timeout(limit, task).await.is_err() {
                    warn!(kind = %key.kind, limit_ms = limit.as_millis(), "background task cancelled");
                    #[cfg(feature = "metrics")]
                    metrics::counter!(*OFFLOAD_TASKS_TIMEOUT, "kind" => key.kind.to_string())
                        .increment(1);
                }
            }
            TimeoutPolicy::Warn(limit) => {
                let started = Instant::now();
                task.await;
                let elapsed = started.elapsed();
                if elapsed > limit {
                    warn!(
                        kind = %key.kind,
                        elapsed_ms = elapsed.as_millis(),
                        limit_ms = limit.as_millis(),
                        "background task exceeded its time limit"
                    );
                }
            }
        }
    }

    /// Number of tasks that have not settled yet.
    pub fn active_task_count(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Returns `true` while the task identified by `key` is running.
    pub fn is_in_flight(&self, key: &OffloadKey) -> bool {
        self.shared
            .handles
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Aborts every running task.
    pub fn cancel_all(&self) {
        for entry in self.shared.handles.iter() {
            entry.value().abort();
        }
    }

    /// Waits until every task spawned so far, and any spawned while waiting,
    /// has settled.
    pub async fn wait_all(&self) {
        loop {
            let idle = self.shared.idle.notified();
            if self.shared.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Like [`wait_all`](Self::wait_all) with an upper bound.
    ///
    /// Returns `false` if tasks were still pending when `timeout` elapsed.
    pub async fn wait_all_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_all()).await.is_ok()
    }
}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Offload for OffloadManager {
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        OffloadManager::spawn(self, kind, future);
    }
}
