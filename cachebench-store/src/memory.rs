//! In-memory store implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cachebench_core::{RequestKey, StoredResponse};
use dashmap::DashMap;
use http::Method;
use smol_str::SmolStr;

use crate::{DeleteStatus, GenerationId, Store, StoreError, StoreResult};

#[derive(Debug)]
struct Generation {
    created: u64,
    entries: DashMap<RequestKey, StoredResponse>,
}

impl Generation {
    fn usage(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| entry.value().memory_size() as u64)
            .sum()
    }
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    generations: DashMap<GenerationId, Arc<Generation>>,
    sequence: AtomicU64,
}

/// In-memory store backed by [`DashMap`].
///
/// `MemoryStore` behaves like a browser's cache storage: entries are grouped
/// in named generations, a generation springs into existence on its first
/// write, and only `GET` requests can be stored. Clones share state.
///
/// # Examples
///
/// ```
/// use cachebench_store::MemoryStore;
///
/// // Unbounded
/// let store = MemoryStore::new();
///
/// // Refuse writes past 5 MiB
/// let bounded = MemoryStore::builder().max_bytes(5 * 1024 * 1024).build();
/// ```
///
/// # Caveats
///
/// - Data is **not persisted**: the store is lost on process restart.
/// - The quota is checked against an estimate (see
///   [`StoredResponse::memory_size`]) and concurrent writers may briefly
///   overshoot it.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
    max_bytes: Option<u64>,
    name: SmolStr,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for `MemoryStore`.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }

    /// Returns `true` if `generation` currently holds `key`.
    pub fn contains(&self, generation: &GenerationId, key: &RequestKey) -> bool {
        self.inner
            .generations
            .get(generation)
            .is_some_and(|g| g.entries.contains_key(key))
    }

    /// Number of entries across all generations.
    pub fn len(&self) -> usize {
        self.inner
            .generations
            .iter()
            .map(|g| g.value().entries.len())
            .sum()
    }

    /// Returns `true` if no generation holds any entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn open(&self, generation: &GenerationId) -> Arc<Generation> {
        self.inner
            .generations
            .entry(generation.clone())
            .or_insert_with(|| {
                tracing::debug!(%generation, "creating store generation");
                Arc::new(Generation {
                    created: self.inner.sequence.fetch_add(1, Ordering::Relaxed),
                    entries: DashMap::new(),
                })
            })
            .value()
            .clone()
    }

    fn total_usage(&self) -> u64 {
        self.inner
            .generations
            .iter()
            .map(|g| g.value().usage())
            .sum()
    }

    fn check_quota(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
        value: &StoredResponse,
    ) -> StoreResult<()> {
        let Some(max_bytes) = self.max_bytes else {
            return Ok(());
        };
        let replaced = self
            .inner
            .generations
            .get(generation)
            .and_then(|g| g.entries.get(key).map(|e| e.value().memory_size() as u64))
            .unwrap_or(0);
        let used = self.total_usage().saturating_sub(replaced);
        let available = max_bytes.saturating_sub(used);
        let needed = value.memory_size() as u64;
        if needed > available {
            return Err(StoreError::QuotaExceeded { needed, available });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
    ) -> StoreResult<Option<StoredResponse>> {
        let Some(current) = self.inner.generations.get(generation).map(|g| g.value().clone())
        else {
            return Ok(None);
        };
        Ok(current.entries.get(key).map(|v| v.value().clone()))
    }

    async fn put(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
        value: StoredResponse,
    ) -> StoreResult<()> {
        if *key.method() != Method::GET {
            return Err(StoreError::UnsupportedMethod(key.method().clone()));
        }
        self.check_quota(generation, key, &value)?;
        self.open(generation).entries.insert(key.clone(), value);
        Ok(())
    }

    async fn generations(&self) -> StoreResult<Vec<GenerationId>> {
        let mut generations: Vec<(u64, GenerationId)> = self
            .inner
            .generations
            .iter()
            .map(|g| (g.value().created, g.key().clone()))
            .collect();
        generations.sort_by_key(|(created, _)| *created);
        Ok(generations.into_iter().map(|(_, id)| id).collect())
    }

    async fn delete_generation(&self, generation: &GenerationId) -> StoreResult<DeleteStatus> {
        match self.inner.generations.remove(generation) {
            Some((_, removed)) => Ok(DeleteStatus::Deleted(removed.entries.len() as u32)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn usage(&self) -> StoreResult<u64> {
        Ok(self.total_usage())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStoreBuilder {
    max_bytes: Option<u64>,
    name: SmolStr,
}

impl Default for MemoryStoreBuilder {
    fn default() -> Self {
        Self {
            max_bytes: None,
            name: SmolStr::new_static("memory"),
        }
    }
}

impl MemoryStoreBuilder {
    /// Refuse writes that would push the store past `max_bytes`.
    pub fn max_bytes(self, max_bytes: u64) -> Self {
        Self {
            max_bytes: Some(max_bytes),
            ..self
        }
    }

    /// Name reported in logs.
    pub fn name(self, name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Build the store.
    pub fn build(self) -> MemoryStore {
        MemoryStore {
            inner: Arc::new(MemoryStoreInner::default()),
            max_bytes: self.max_bytes,
            name: self.name,
        }
    }
}
