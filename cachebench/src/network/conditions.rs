//! Simulated network conditions.
//!
//! Benchmarks run each strategy under a handful of named conditions.
//! [`ConditionedNetwork`] wraps any [`Network`] and degrades it accordingly;
//! the condition can be swapped between runs without rebuilding the
//! dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use cachebench_core::{Network, NetworkError, NetworkResult, Request};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A named network condition.
///
/// In YAML: `good`, `offline`, `{ slow: { latency: 300ms } }` or
/// `{ flaky: { fail_every: 3 } }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkCondition {
    /// Requests pass through untouched.
    #[default]
    Good,
    /// Every request is delayed before it is sent.
    Slow {
        /// Added latency per request.
        #[serde(with = "humantime_serde")]
        latency: Duration,
    },
    /// Every `fail_every`-th request is aborted.
    Flaky {
        /// Period of failures. `0` and `1` abort every request.
        fail_every: u64,
    },
    /// No request reaches the network.
    Offline,
}

impl NetworkCondition {
    /// Short label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Slow { .. } => "slow",
            Self::Flaky { .. } => "flaky",
            Self::Offline => "offline",
        }
    }
}

#[derive(Debug)]
struct ConditionState {
    condition: RwLock<NetworkCondition>,
    attempts: AtomicU64,
}

/// Wraps a [`Network`] and applies a [`NetworkCondition`] to every fetch.
///
/// Clones share the condition.
#[derive(Debug)]
pub struct ConditionedNetwork<N> {
    inner: N,
    state: Arc<ConditionState>,
}

impl<N: Clone> Clone for ConditionedNetwork<N> {
    fn clone(&self) -> Self {
        ConditionedNetwork {
            inner: self.inner.clone(),
            state: self.state.clone(),
        }
    }
}

impl<N> ConditionedNetwork<N> {
    /// Wraps `inner` under `condition`.
    pub fn new(inner: N, condition: NetworkCondition) -> Self {
        ConditionedNetwork {
            inner,
            state: Arc::new(ConditionState {
                condition: RwLock::new(condition),
                attempts: AtomicU64::new(0),
            }),
        }
    }

    /// Current condition.
    pub fn condition(&self) -> NetworkCondition {
        *self
            .state
            .condition
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the condition and restarts the flaky failure count.
    pub fn set_condition(&self, condition: NetworkCondition) {
        let mut current = self
            .state
            .condition
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        info!(from = current.as_str(), to = condition.as_str(), "network condition changed");
        *current = condition;
        self.state.attempts.store(0, Ordering::Relaxed);
    }

    /// Returns the wrapped network.
    pub fn inner(&self) -> &N {
        &self.inner
    }
}

#[async_trait]
impl<N> Network for ConditionedNetwork<N>
where
    N: Network,
{
    async fn fetch(&self, request: Request) -> NetworkResult {
        match self.condition() {
            NetworkCondition::Good => {}
            NetworkCondition::Slow { latency } => {
                debug!(latency_ms = latency.as_millis(), "delaying fetch");
                tokio::time::sleep(latency).await;
            }
            NetworkCondition::Flaky { fail_every } => {
                let attempt = self.state.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                if attempt.is_multiple_of(fail_every.max(1)) {
                    debug!(attempt, "flaky network aborting fetch");
                    return Err(NetworkError::Aborted);
                }
            }
            NetworkCondition::Offline => return Err(NetworkError::Offline),
        }
        self.inner.fetch(request).await
    }
}
