//! Store lifecycle: install, activate, reset.
//!
//! The lifecycle manager owns the transitions between "no active generation"
//! and "generation active". Activation purges every generation except the
//! configured one and makes the dispatcher start controlling requests; a
//! reset drops every generation, including the current one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use cachebench_store::{DeleteStatus, GenerationId, Store};
use futures::future::join_all;
use tracing::{debug, info};

use crate::error::LifecycleError;

/// Lifecycle state of the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Installed (or reset) but no generation has been activated.
    #[default]
    NoActiveGeneration,
    /// The given generation is the one policies write to.
    GenerationActive(GenerationId),
}

/// Generations removed by an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// The generation that became active.
    pub active: GenerationId,
    /// Stale generations that were deleted.
    pub purged: Vec<GenerationId>,
}

/// Generations removed by a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Every generation that was deleted.
    pub deleted: Vec<GenerationId>,
    /// Number of entries dropped across those generations.
    pub entries: u32,
}

#[derive(Debug)]
struct LifecycleInner {
    state: RwLock<LifecycleState>,
    controlling: AtomicBool,
}

/// Drives store generations through install, activate and reset.
///
/// Clones share state.
#[derive(Clone)]
pub struct LifecycleManager {
    store: Arc<dyn Store>,
    generation: GenerationId,
    inner: Arc<LifecycleInner>,
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("store", &self.store.name())
            .field("generation", &self.generation)
            .field("inner", &self.inner)
            .finish()
    }
}

impl LifecycleManager {
    /// Creates a manager for `generation`, initially not controlling.
    pub fn new(store: Arc<dyn Store>, generation: GenerationId) -> Self {
        LifecycleManager {
            store,
            generation,
            inner: Arc::new(LifecycleInner {
                state: RwLock::new(LifecycleState::NoActiveGeneration),
                controlling: AtomicBool::new(false),
            }),
        }
    }

    /// The configured current generation.
    pub fn generation(&self) -> &GenerationId {
        &self.generation
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` once activation has completed.
    pub fn is_controlling(&self) -> bool {
        self.inner.controlling.load(Ordering::Acquire)
    }

    /// Installs the layer. Has no store effect.
    pub fn install(&self) {
        info!(generation = %self.generation, "installed");
    }

    /// Deletes every generation except the current one and starts
    /// controlling requests.
    pub async fn activate(&self) -> Result<ActivationReport, LifecycleError> {
        let stale: Vec<GenerationId> = self
            .store
            .generations()
            .await?
            .into_iter()
            .filter(|generation| *generation != self.generation)
            .collect();

        let purged = self.delete_all(stale).await?;
        for (generation, entries) in &purged {
            info!(%generation, entries, "deleted stale generation");
        }

        self.set_state(LifecycleState::GenerationActive(self.generation.clone()));
        self.inner.controlling.store(true, Ordering::Release);
        info!(generation = %self.generation, purged = purged.len(), "activated");

        Ok(ActivationReport {
            active: self.generation.clone(),
            purged: purged.into_iter().map(|(generation, _)| generation).collect(),
        })
    }

    /// Deletes every generation. The next write recreates the current one.
    pub async fn reset(&self) -> Result<ResetReport, LifecycleError> {
        let generations = self.store.generations().await?;
        let deleted = self.delete_all(generations).await?;
        self.set_state(LifecycleState::NoActiveGeneration);

        let report = ResetReport {
            entries: deleted.iter().map(|(_, entries)| entries).sum(),
            deleted: deleted.into_iter().map(|(generation, _)| generation).collect(),
        };
        info!(
            generations = report.deleted.len(),
            entries = report.entries,
            "store reset"
        );
        Ok(report)
    }

    async fn delete_all(
        &self,
        generations: Vec<GenerationId>,
    ) -> Result<Vec<(GenerationId, u32)>, LifecycleError> {
        let results = join_all(generations.into_iter().map(|generation| async move {
            let status = self.store.delete_generation(&generation).await;
            (generation, status)
        }))
        .await;

        let mut deleted = Vec::with_capacity(results.len());
        for (generation, status) in results {
            match status? {
                DeleteStatus::Deleted(entries) => deleted.push((generation, entries)),
                DeleteStatus::Missing => {
                    debug!(%generation, "generation already gone");
                }
            }
        }
        if deleted.is_empty() {
            debug!("no generations to delete");
        }
        Ok(deleted)
    }

    fn set_state(&self, state: LifecycleState) {
        let mut current = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*current, to = ?state, "lifecycle transition");
        *current = state;
    }
}
