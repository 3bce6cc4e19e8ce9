use std::sync::Arc;

use async_trait::async_trait;
use cachebench_core::{RequestKey, StoredResponse};

use crate::{DeleteStatus, GenerationId, StoreError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable, generation-keyed response store.
///
/// Each generation is an unordered map from [`RequestKey`] to
/// [`StoredResponse`] with overwrite-on-put semantics. Generations are
/// created lazily by the first `put` and removed as a whole.
#[async_trait]
pub trait Store: Sync + Send {
    /// Reads `key` from one generation.
    async fn get(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
    ) -> StoreResult<Option<StoredResponse>>;

    /// Writes `value` under `key`, creating the generation if needed.
    async fn put(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
        value: StoredResponse,
    ) -> StoreResult<()>;

    /// Lists live generations in creation order.
    async fn generations(&self) -> StoreResult<Vec<GenerationId>>;

    /// Deletes a generation and everything in it.
    async fn delete_generation(&self, generation: &GenerationId) -> StoreResult<DeleteStatus>;

    /// Searches every live generation, oldest first, and returns the first hit.
    async fn lookup(&self, key: &RequestKey) -> StoreResult<Option<StoredResponse>> {
        for generation in self.generations().await? {
            if let Some(value) = self.get(&generation, key).await? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Approximate number of bytes held across all generations.
    async fn usage(&self) -> StoreResult<u64>;

    /// Returns the name of this store for logs.
    fn name(&self) -> &str {
        "store"
    }
}

#[async_trait]
impl Store for &dyn Store {
    async fn get(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
    ) -> StoreResult<Option<StoredResponse>> {
        (*self).get(generation, key).await
    }

    async fn put(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
        value: StoredResponse,
    ) -> StoreResult<()> {
        (*self).put(generation, key, value).await
    }

    async fn generations(&self) -> StoreResult<Vec<GenerationId>> {
        (*self).generations().await
    }

    async fn delete_generation(&self, generation: &GenerationId) -> StoreResult<DeleteStatus> {
        (*self).delete_generation(generation).await
    }

    async fn lookup(&self, key: &RequestKey) -> StoreResult<Option<StoredResponse>> {
        (*self).lookup(key).await
    }

    async fn usage(&self) -> StoreResult<u64> {
        (*self).usage().await
    }

    fn name(&self) -> &str {
        (*self).name()
    }
}

#[async_trait]
impl Store for Box<dyn Store> {
    async fn get(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
    ) -> StoreResult<Option<StoredResponse>> {
        (**self).get(generation, key).await
    }

    async fn put(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
        value: StoredResponse,
    ) -> StoreResult<()> {
        (**self).put(generation, key, value).await
    }

    async fn generations(&self) -> StoreResult<Vec<GenerationId>> {
        (**self).generations().await
    }

    async fn delete_generation(&self, generation: &GenerationId) -> StoreResult<DeleteStatus> {
        (**self).delete_generation(generation).await
    }

    async fn lookup(&self, key: &RequestKey) -> StoreResult<Option<StoredResponse>> {
        (**self).lookup(key).await
    }

    async fn usage(&self) -> StoreResult<u64> {
        (**self).usage().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl Store for Arc<dyn Store> {
    async fn get(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
    ) -> StoreResult<Option<StoredResponse>> {
        (**self).get(generation, key).await
    }

    async fn put(
        &self,
        generation: &GenerationId,
        key: &RequestKey,
        value: StoredResponse,
    ) -> StoreResult<()> {
        (**self).put(generation, key, value).await
    }

    async fn generations(&self) -> StoreResult<Vec<GenerationId>> {
        (**self).generations().await
    }

    async fn delete_generation(&self, generation: &GenerationId) -> StoreResult<DeleteStatus> {
        (**self).delete_generation(generation).await
    }

    async fn lookup(&self, key: &RequestKey) -> StoreResult<Option<StoredResponse>> {
        (**self).lookup(key).await
    }

    async fn usage(&self) -> StoreResult<u64> {
        (**self).usage().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
