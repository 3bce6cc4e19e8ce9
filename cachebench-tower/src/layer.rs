use std::error::Error as StdError;
use std::sync::Arc;

use bytes::Bytes;
use cachebench::{Config, Dispatcher, MemoryStore, Request, Store};
use http::Response;
use tower::{Layer, Service};
use tracing::debug;

use crate::service::InterceptService;
use crate::upstream::TowerNetwork;

/// Tower [`Layer`] that puts the interception layer in front of a service.
///
/// The wrapped service becomes the network. Every call to
/// [`Layer::layer`] builds a fresh [`Dispatcher`] sharing this layer's store.
///
/// Services built from separate `layer` calls therefore do not share a
/// selected strategy or a lifecycle: each has to be activated and controlled
/// through its own [`InterceptService::dispatcher`]. Layer once per host and
/// clone the resulting service to keep a single dispatcher; clones share it.
///
/// [`InterceptService::dispatcher`]: crate::InterceptService::dispatcher
#[derive(Clone)]
pub struct InterceptLayer {
    store: Arc<dyn Store>,
    config: Config,
}

impl std::fmt::Debug for InterceptLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptLayer")
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish()
    }
}

impl InterceptLayer {
    /// Layer over a fresh [`MemoryStore`] with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new builder.
    pub fn builder() -> InterceptLayerBuilder {
        InterceptLayerBuilder::default()
    }
}

impl Default for InterceptLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for InterceptLayer
where
    S: Service<Request, Response = Response<Bytes>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    type Service = InterceptService;

    fn layer(&self, inner: S) -> Self::Service {
        debug!(generation = %self.config.generation, "installing interception layer");
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.store),
            TowerNetwork::new(inner),
            self.config.clone(),
        );
        InterceptService::new(dispatcher)
    }
}

/// Builder for [`InterceptLayer`].
#[derive(Default)]
pub struct InterceptLayerBuilder {
    store: Option<Arc<dyn Store>>,
    config: Config,
}

impl InterceptLayerBuilder {
    /// Set the response store. Defaults to a fresh [`MemoryStore`].
    pub fn store<S>(self, store: S) -> Self
    where
        S: Store + 'static,
    {
        InterceptLayerBuilder {
            store: Some(Arc::new(store)),
            ..self
        }
    }

    /// Set the dispatcher configuration.
    pub fn config(self, config: Config) -> Self {
        InterceptLayerBuilder { config, ..self }
    }

    /// Build the layer.
    pub fn build(self) -> InterceptLayer {
        InterceptLayer {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new())),
            config: self.config,
        }
    }
}
