#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # cachebench
//!
//! Request-interception layer for benchmarking client-side HTTP caching
//! strategies.
//!
//! A [`Dispatcher`] sits between an application and the network. Every
//! intercepted request is answered by one of four interchangeable policies,
//! backed by a generation-versioned response store:
//!
//! | strategy                   | first source | fallback / background                    |
//! |----------------------------|--------------|------------------------------------------|
//! | `network-first`            | network      | store on transport failure               |
//! | `cache-first`              | store        | network on miss                          |
//! | `stale-while-revalidate`   | store        | network refresh always runs in background|
//! | `cache-then-network`       | store        | network started together, store preferred|
//!
//! The active strategy is switched at runtime through the control channel
//! ([`ControlMessage`]); a reset drops every stored generation.
//!
//! ## Lifecycle
//!
//! 1. [`Dispatcher::install`]: no store effect.
//! 2. [`Dispatcher::activate`]: deletes every generation except the
//!    configured one and starts routing requests through policies. Until
//!    then requests go straight to the network.
//! 3. [`Dispatcher::handle`] / [`Dispatcher::fetch`]: answer requests.
//! 4. [`Dispatcher::settle`]: wait for background store writes and
//!    revalidations before teardown.
//!
//! ## Failure model
//!
//! Request handling never returns an error. When neither the network nor the
//! store can answer, the response is a synthetic `408 Request Timeout` with a
//! plain-text body. Store write failures are logged and dropped.
//!
//! ## Features
//!
//! - `metrics`: record response and background task counters through the
//!   [`metrics`](https://docs.rs/metrics) facade.

pub mod config;
pub mod control;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
mod metrics;
pub mod network;
pub mod offload;
pub mod policy;

pub use cachebench_core::{
    FetchEvent, Network, NetworkError, NetworkResult, Offload, Request, RequestKey, Response,
    ResponseOutcome, ResponseSource, Strategy, StoredResponse, SyntheticError,
};
pub use cachebench_store::{GenerationId, MemoryStore, Store, StoreError};
pub use config::Config;
pub use control::{ControlMessage, ControlOutcome};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, ControlError, LifecycleError};
pub use lifecycle::{ActivationReport, LifecycleState, ResetReport};
pub use network::{ConditionedNetwork, NetworkCondition};
pub use offload::{OffloadConfig, OffloadManager, TimeoutPolicy};
