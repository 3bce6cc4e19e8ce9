//! Strategy dispatcher.
//!
//! The [`Dispatcher`] is the interception boundary: every request goes
//! through [`Dispatcher::handle`], which looks up the selected strategy name,
//! resolves it to one of the four policies and returns whatever that policy
//! produces. The selected name is plain shared state that the control
//! channel replaces at any time; a request reads it once on entry.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use cachebench_core::{
    FetchEvent, Network, Offload, Request, Response, ResponseOutcome, Strategy, SyntheticError,
};
use cachebench_store::{GenerationId, MemoryStore, Store, StoreResult};
use smol_str::SmolStr;
use tracing::{Instrument, debug, debug_span, info, warn};

use crate::config::Config;
use crate::control::{ControlMessage, ControlOutcome};
use crate::error::{ControlError, LifecycleError};
use crate::lifecycle::{ActivationReport, LifecycleManager, LifecycleState, ResetReport};
use crate::network::{ConditionedNetwork, NetworkCondition};
use crate::offload::OffloadManager;
use crate::policy::{
    CacheFirst, CacheThenNetwork, NetworkFirst, Policy, PolicyContext, StaleWhileRevalidate,
};

struct DispatcherInner {
    ctx: PolicyContext,
    network: ConditionedNetwork<Arc<dyn Network>>,
    selected: RwLock<SmolStr>,
    default_strategy: Strategy,
    offload: OffloadManager,
    lifecycle: LifecycleManager,
}

/// Routes intercepted requests to the selected caching policy.
///
/// Clones share state: the selected strategy, the store, the network, the
/// lifecycle and the offload manager.
///
/// # Example
///
/// ```ignore
/// use cachebench::{Config, Dispatcher};
/// use cachebench_store::MemoryStore;
///
/// let dispatcher = Dispatcher::new(MemoryStore::new(), my_network, Config::default());
/// dispatcher.install();
/// dispatcher.activate().await?;
///
/// let response = dispatcher.fetch(request).await;
/// dispatcher.settle().await;
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("selected", &self.strategy_name())
            .field("default_strategy", &self.inner.default_strategy)
            .field("lifecycle", &self.inner.lifecycle)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher in front of `network`, storing into `store`.
    pub fn new<S, N>(store: S, network: N, config: Config) -> Self
    where
        S: Store + 'static,
        N: Network + 'static,
    {
        let store: Arc<dyn Store> = Arc::new(store);
        let network = ConditionedNetwork::new(
            Arc::new(network) as Arc<dyn Network>,
            config.network.unwrap_or_default(),
        );
        let selected = config.initial_strategy();
        info!(
            generation = %config.generation,
            strategy = %selected,
            store = store.name(),
            "dispatcher created"
        );

        Dispatcher {
            inner: Arc::new(DispatcherInner {
                ctx: PolicyContext::new(
                    store.clone(),
                    Arc::new(network.clone()),
                    config.generation.clone(),
                ),
                network,
                selected: RwLock::new(selected),
                default_strategy: config.default_strategy,
                offload: OffloadManager::new(config.offload),
                lifecycle: LifecycleManager::new(store, config.generation),
            }),
        }
    }

    /// Creates a dispatcher backed by a fresh [`MemoryStore`] and default
    /// configuration.
    pub fn in_memory<N>(network: N) -> Self
    where
        N: Network + 'static,
    {
        Self::new(MemoryStore::new(), network, Config::default())
    }

    /// Answers an intercepted request.
    ///
    /// Never fails: when no source can answer the response is a synthetic
    /// `408`.
    pub async fn handle<O>(&self, event: FetchEvent<O>) -> Response
    where
        O: Offload,
    {
        self.respond(event).await.into_response()
    }

    /// Like [`handle`](Self::handle) but keeps the outcome tag.
    pub async fn respond<O>(&self, event: FetchEvent<O>) -> ResponseOutcome
    where
        O: Offload,
    {
        if !self.inner.lifecycle.is_controlling() {
            return self.passthrough(event).await;
        }

        let strategy = self.strategy();
        let span = debug_span!("dispatch", key = %event.key(), %strategy);
        let start = Instant::now();
        let ctx = &self.inner.ctx;

        let outcome = async move {
            match strategy {
                Strategy::NetworkFirst => NetworkFirst.respond(ctx, event).await,
                Strategy::CacheFirst => CacheFirst.respond(ctx, event).await,
                Strategy::StaleWhileRevalidate => StaleWhileRevalidate.respond(ctx, event).await,
                Strategy::CacheThenNetwork => CacheThenNetwork.respond(ctx, event).await,
            }
        }
        .instrument(span)
        .await;

        debug!(%strategy, source = %outcome.source(), "request answered");
        crate::metrics::record_response(strategy, outcome.source(), start.elapsed());
        outcome
    }

    /// Answers `request`, registering background work on the dispatcher's own
    /// offload manager.
    pub async fn fetch(&self, request: Request) -> Response {
        self.handle(FetchEvent::new(request, self.inner.offload.clone()))
            .await
    }

    async fn passthrough<O>(&self, event: FetchEvent<O>) -> ResponseOutcome
    where
        O: Offload,
    {
        let (request, key, _) = event.into_parts();
        debug!(%key, "not controlling, passing through");
        match self.inner.ctx.network().fetch(request).await {
            Ok(response) => ResponseOutcome::Network(response),
            Err(error) => {
                warn!(%key, %error, "network failed before activation");
                ResponseOutcome::Synthetic(SyntheticError::NetworkFailed)
            }
        }
    }

    /// Replaces the selected strategy name and returns the previous one.
    ///
    /// Names that match no strategy are kept as is and dispatch to the
    /// default strategy.
    pub fn set_strategy(&self, name: impl Into<SmolStr>) -> SmolStr {
        let name = name.into();
        if name.parse::<Strategy>().is_err() {
            warn!(
                %name,
                fallback = %self.inner.default_strategy,
                "unknown strategy selected, requests will use the default"
            );
        }
        let mut selected = self
            .inner
            .selected
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *selected, name);
        info!(from = %previous, to = %*selected, "strategy changed");
        previous
    }

    /// Selected strategy name, verbatim.
    pub fn strategy_name(&self) -> SmolStr {
        self.inner
            .selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Strategy requests are currently dispatched to.
    pub fn strategy(&self) -> Strategy {
        self.strategy_name()
            .parse()
            .unwrap_or(self.inner.default_strategy)
    }

    /// Applies a control message.
    pub async fn on_message(&self, message: ControlMessage) -> Result<ControlOutcome, ControlError> {
        debug!(kind = message.kind(), "control message received");
        match message {
            ControlMessage::ChangeStrategy { strategy } => {
                let from = self.set_strategy(strategy.clone());
                Ok(ControlOutcome::StrategyChanged { from, to: strategy })
            }
            ControlMessage::CacheReset => Ok(ControlOutcome::CacheReset(self.reset().await?)),
        }
    }

    /// Parses and applies a JSON control message. Malformed messages change
    /// nothing.
    pub async fn on_message_json(&self, message: &str) -> Result<ControlOutcome, ControlError> {
        let message = ControlMessage::from_json(message).inspect_err(|error| {
            warn!(%error, "ignoring malformed control message");
        })?;
        self.on_message(message).await
    }

    /// Install hook. Has no store effect.
    pub fn install(&self) {
        self.inner.lifecycle.install();
    }

    /// Purges stale generations and starts controlling requests.
    pub async fn activate(&self) -> Result<ActivationReport, LifecycleError> {
        self.inner.lifecycle.activate().await
    }

    /// Deletes every generation. The selected strategy is untouched.
    pub async fn reset(&self) -> Result<ResetReport, LifecycleError> {
        self.inner.lifecycle.reset().await
    }

    /// Waits for every registered store write and background fetch.
    pub async fn settle(&self) {
        self.inner.offload.wait_all().await;
    }

    /// Approximate number of bytes held by the store.
    pub async fn usage(&self) -> StoreResult<u64> {
        self.inner.ctx.store().usage().await
    }

    /// Current lifecycle state.
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.inner.lifecycle.state()
    }

    /// Returns `true` once the dispatcher answers requests through policies.
    pub fn is_controlling(&self) -> bool {
        self.inner.lifecycle.is_controlling()
    }

    /// Generation that write-throughs go to.
    pub fn generation(&self) -> &GenerationId {
        self.inner.ctx.generation()
    }

    /// Strategy used for unknown names.
    pub fn default_strategy(&self) -> Strategy {
        self.inner.default_strategy
    }

    /// Simulated network condition currently applied.
    pub fn network_condition(&self) -> NetworkCondition {
        self.inner.network.condition()
    }

    /// Swaps the simulated network condition.
    pub fn set_network_condition(&self, condition: NetworkCondition) {
        self.inner.network.set_condition(condition);
    }

    /// Store handle.
    pub fn store(&self) -> &Arc<dyn Store> {
        self.inner.ctx.store()
    }

    /// Offload manager tracking background work.
    pub fn offload(&self) -> &OffloadManager {
        &self.inner.offload
    }
}
