//! Stale-While-Revalidate: answer from the store, refresh it in the background.

use async_trait::async_trait;
use cachebench_core::{FetchEvent, Offload, ResponseOutcome, SyntheticError};
use tracing::{debug, warn};

use super::{Policy, PolicyContext};

/// Returns the stored response immediately and revalidates it behind the
/// caller's back.
///
/// The revalidation is registered on the event's lifetime before the store
/// is read, so it runs to completion whether or not the caller waits on it.
/// On a miss the caller waits for the revalidation; if that fails too the
/// outcome is [`SyntheticError::NetworkFailed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StaleWhileRevalidate;

#[async_trait]
impl Policy for StaleWhileRevalidate {
    async fn respond<O>(&self, ctx: &PolicyContext, event: FetchEvent<O>) -> ResponseOutcome
    where
        O: Offload,
    {
        let (request, key, lifetime) = event.into_parts();
        let revalidation = ctx.background_fetch(&lifetime, "revalidate", &key, request);

        if let Some(stored) = ctx.lookup(&key).await {
            debug!(%key, "serving stale entry, revalidating in background");
            return ResponseOutcome::Cached(stored.to_response());
        }

        match revalidation.await {
            Ok(Ok(response)) => ResponseOutcome::Network(response),
            Ok(Err(_)) => ResponseOutcome::Synthetic(SyntheticError::NetworkFailed),
            Err(_) => {
                warn!(%key, "revalidation dropped before answering");
                ResponseOutcome::Synthetic(SyntheticError::NetworkFailed)
            }
        }
    }
}
