//! Cache-Then-Network: race the store read against a network refresh.

use async_trait::async_trait;
use cachebench_core::{FetchEvent, Offload, ResponseOutcome, SyntheticError};
use tracing::{debug, warn};

use super::{Policy, PolicyContext};

/// Starts a network fetch and a store read together and prefers the store.
///
/// The fetch always runs to completion under the event's lifetime and
/// writes through on success. A store hit is returned as soon as it is
/// read; a miss waits on the fetch, and a failed fetch yields
/// [`SyntheticError::BothFailed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheThenNetwork;

#[async_trait]
impl Policy for CacheThenNetwork {
    async fn respond<O>(&self, ctx: &PolicyContext, event: FetchEvent<O>) -> ResponseOutcome
    where
        O: Offload,
    {
        let (request, key, lifetime) = event.into_parts();
        let refresh = ctx.background_fetch(&lifetime, "refresh", &key, request);

        if let Some(stored) = ctx.lookup(&key).await {
            debug!(%key, "store answered first, refresh continues");
            return ResponseOutcome::Cached(stored.to_response());
        }

        match refresh.await {
            Ok(Ok(response)) => ResponseOutcome::Network(response),
            Ok(Err(_)) => ResponseOutcome::Synthetic(SyntheticError::BothFailed),
            Err(_) => {
                warn!(%key, "refresh dropped before answering");
                ResponseOutcome::Synthetic(SyntheticError::BothFailed)
            }
        }
    }
}
