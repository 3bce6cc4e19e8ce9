//! Network adapter for Tower services.
//!
//! This module provides [`TowerNetwork`], which implements the interception
//! layer's [`Network`] trait for any Tower service. The wrapped service
//! *is* the network: every fetch a policy makes goes through it.
//!
//! Users typically don't interact with this module directly; it's used
//! internally by [`InterceptLayer`](crate::InterceptLayer).

use std::error::Error as StdError;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use cachebench::{Network, NetworkError, NetworkResult, Request};
use http::Response;
use tower::{Service, ServiceExt};

/// Adapter that implements [`Network`] for a Tower service.
///
/// Each fetch clones the service, drives it to readiness and calls it, so
/// background revalidations never contend with the request path for the
/// same service instance. Service errors become
/// [`NetworkError::Transport`].
pub struct TowerNetwork<S> {
    service: Mutex<S>,
}

impl<S> TowerNetwork<S> {
    /// Creates a new adapter wrapping the given service.
    pub fn new(service: S) -> Self {
        TowerNetwork {
            service: Mutex::new(service),
        }
    }
}

impl<S> std::fmt::Debug for TowerNetwork<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TowerNetwork").finish_non_exhaustive()
    }
}

#[async_trait]
impl<S> Network for TowerNetwork<S>
where
    S: Service<Request, Response = Response<Bytes>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    async fn fetch(&self, request: Request) -> NetworkResult {
        let service = self
            .service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        service
            .oneshot(request)
            .await
            .map_err(NetworkError::transport)
    }
}
