//! The network as seen from the interception layer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Request, Response};

/// Transport-level failure of a network fetch.
///
/// Any HTTP status, including `5xx`, is a successful fetch; only failures to
/// obtain a response at all end up here.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The host has no connectivity.
    #[error("network is offline")]
    Offline,
    /// The fetch was aborted before a response arrived.
    #[error("fetch aborted")]
    Aborted,
    /// Any other transport error (DNS, connection reset, ...).
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl NetworkError {
    /// Wraps a foreign transport error.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Transport(error.into())
    }
}

/// Result of a network fetch.
pub type NetworkResult = Result<Response, NetworkError>;

/// Trait for fetching requests from the network.
///
/// Implementations must be shareable across tasks: policies clone the handle
/// into background work that outlives the request that started it.
///
/// # Examples
///
/// ```rust,ignore
/// use cachebench_core::{Network, NetworkResult, Request};
///
/// struct Offline;
///
/// #[async_trait::async_trait]
/// impl Network for Offline {
///     async fn fetch(&self, _request: Request) -> NetworkResult {
///         Err(cachebench_core::NetworkError::Offline)
///     }
/// }
/// ```
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetches `request` from the network.
    async fn fetch(&self, request: Request) -> NetworkResult;
}

#[async_trait]
impl<N> Network for Arc<N>
where
    N: Network + ?Sized,
{
    async fn fetch(&self, request: Request) -> NetworkResult {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl Network for Box<dyn Network> {
    async fn fetch(&self, request: Request) -> NetworkResult {
        (**self).fetch(request).await
    }
}
