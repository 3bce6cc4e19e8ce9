//! Cache-First: the store is authoritative, the network fills misses.

use async_trait::async_trait;
use cachebench_core::{FetchEvent, Offload, ResponseOutcome, SyntheticError};
use tracing::{debug, warn};

use super::{Policy, PolicyContext};

/// Serves stored responses without touching the network.
///
/// Only a miss reaches the network; the fetched response is written through
/// and returned, and a transport failure yields
/// [`SyntheticError::NetworkFailed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheFirst;

#[async_trait]
impl Policy for CacheFirst {
    async fn respond<O>(&self, ctx: &PolicyContext, event: FetchEvent<O>) -> ResponseOutcome
    where
        O: Offload,
    {
        if let Some(stored) = ctx.lookup(event.key()).await {
            return ResponseOutcome::Cached(stored.to_response());
        }

        let (request, key, lifetime) = event.into_parts();
        match ctx.network().fetch(request).await {
            Ok(response) => {
                debug!(%key, status = %response.status(), "network filled miss");
                ctx.write_through(&lifetime, &key, &response);
                ResponseOutcome::Network(response)
            }
            Err(error) => {
                warn!(%key, %error, "network failed after store miss");
                ResponseOutcome::Synthetic(SyntheticError::NetworkFailed)
            }
        }
    }
}
