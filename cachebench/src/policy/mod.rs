//! Caching policies.
//!
//! A policy decides, for one intercepted request, whether the response comes
//! from the store, from the network, or from some race/fallback combination
//! of the two. All four policies implement [`Policy`] and share the helpers
//! on [`PolicyContext`]:
//!
//! - **lookup** reads the store; a read error counts as a miss
//! - **write-through** registers a detached store write on the event
//! - **background fetch** starts a network fetch as registered background
//!   work and hands its result back through a channel
//!
//! None of them ever fails: every path ends in a [`ResponseOutcome`].

use std::sync::Arc;

use async_trait::async_trait;
use cachebench_core::{
    FetchEvent, Network, NetworkResult, Offload, Request, RequestKey, Response, ResponseOutcome,
    StoredResponse,
};
use cachebench_store::{GenerationId, Store};
use tokio::sync::oneshot;
use tracing::{debug, warn};

pub mod cache_first;
pub mod cache_then_network;
pub mod network_first;
pub mod stale_while_revalidate;

pub use cache_first::CacheFirst;
pub use cache_then_network::CacheThenNetwork;
pub use network_first::NetworkFirst;
pub use stale_while_revalidate::StaleWhileRevalidate;

/// A caching strategy applied to one intercepted request.
#[async_trait]
pub trait Policy: Send + Sync {
    /// Produces the response for `event`, registering any background store
    /// work on the event's lifetime.
    async fn respond<O>(&self, ctx: &PolicyContext, event: FetchEvent<O>) -> ResponseOutcome
    where
        O: Offload;
}

/// Handles shared by every policy invocation.
#[derive(Clone)]
pub struct PolicyContext {
    store: Arc<dyn Store>,
    network: Arc<dyn Network>,
    generation: GenerationId,
}

impl std::fmt::Debug for PolicyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyContext")
            .field("store", &self.store.name())
            .field("generation", &self.generation)
            .finish()
    }
}

impl PolicyContext {
    /// Creates a context writing into `generation`.
    pub fn new(store: Arc<dyn Store>, network: Arc<dyn Network>, generation: GenerationId) -> Self {
        PolicyContext {
            store,
            network,
            generation,
        }
    }

    /// Returns the store handle.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Returns the network handle.
    pub fn network(&self) -> &Arc<dyn Network> {
        &self.network
    }

    /// Returns the generation written by write-throughs.
    pub fn generation(&self) -> &GenerationId {
        &self.generation
    }

    /// Reads `key` from the store. Read errors are logged and treated as a miss.
    pub async fn lookup(&self, key: &RequestKey) -> Option<StoredResponse> {
        match self.store.lookup(key).await {
            Ok(Some(stored)) => {
                debug!(%key, age_ms = stored.age().as_millis(), "store hit");
                Some(stored)
            }
            Ok(None) => {
                debug!(%key, "store miss");
                None
            }
            Err(error) => {
                warn!(%key, %error, "store read failed, treating as miss");
                None
            }
        }
    }

    /// Registers a detached write of `response` under `key`.
    ///
    /// The write runs as background work on `lifetime`; its failure is logged
    /// and dropped.
    pub fn write_through<O>(&self, lifetime: &O, key: &RequestKey, response: &Response)
    where
        O: Offload,
    {
        let snapshot = StoredResponse::from_response(response);
        let ctx = self.clone();
        let key = key.clone();
        lifetime.spawn("store_write", async move {
            ctx.store_write(&key, snapshot).await;
        });
    }

    /// Writes `snapshot` into the current generation, swallowing failures.
    pub async fn store_write(&self, key: &RequestKey, snapshot: StoredResponse) {
        match self.store.put(&self.generation, key, snapshot).await {
            Ok(()) => debug!(%key, generation = %self.generation, "store updated"),
            Err(error) => {
                warn!(%key, %error, "store write failed, dropping");
                crate::metrics::record_store_write_failure();
            }
        }
    }

    /// Starts a network fetch as background work on `lifetime`.
    ///
    /// On success the response is handed to the returned receiver first and
    /// then written through; on failure the error is handed over and nothing
    /// is written. Whether or not anyone awaits the receiver, the task runs
    /// to completion under `lifetime`.
    pub fn background_fetch<O>(
        &self,
        lifetime: &O,
        kind: &'static str,
        key: &RequestKey,
        request: Request,
    ) -> oneshot::Receiver<NetworkResult>
    where
        O: Offload,
    {
        let (tx, rx) = oneshot::channel();
        let ctx = self.clone();
        let key = key.clone();
        lifetime.spawn(kind, async move {
            match ctx.network.fetch(request).await {
                Ok(response) => {
                    let snapshot = StoredResponse::from_response(&response);
                    // The caller may already have been answered from the store.
                    let _ = tx.send(Ok(response));
                    ctx.store_write(&key, snapshot).await;
                }
                Err(error) => {
                    warn!(%key, %error, "background fetch failed");
                    let _ = tx.send(Err(error));
                }
            }
        });
        rx
    }
}
