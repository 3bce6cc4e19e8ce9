//! Network-First: the network is authoritative, the store is a fallback.

use async_trait::async_trait;
use cachebench_core::{FetchEvent, Offload, ResponseOutcome, SyntheticError};
use tracing::{debug, warn};

use super::{Policy, PolicyContext};

/// Fetches from the network and falls back to the store on transport failure.
///
/// A successful response (any status) is written through to the current
/// generation and returned. On failure the store is searched; a miss yields
/// [`SyntheticError::NetworkFailed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkFirst;

#[async_trait]
impl Policy for NetworkFirst {
    async fn respond<O>(&self, ctx: &PolicyContext, event: FetchEvent<O>) -> ResponseOutcome
    where
        O: Offload,
    {
        let (request, key, lifetime) = event.into_parts();
        match ctx.network().fetch(request).await {
            Ok(response) => {
                debug!(%key, status = %response.status(), "network answered");
                ctx.write_through(&lifetime, &key, &response);
                ResponseOutcome::Network(response)
            }
            Err(error) => {
                warn!(%key, %error, "network failed, falling back to store");
                match ctx.lookup(&key).await {
                    Some(stored) => ResponseOutcome::Cached(stored.to_response()),
                    None => ResponseOutcome::Synthetic(SyntheticError::NetworkFailed),
                }
            }
        }
    }
}
