#![warn(missing_docs)]
//! # cachebench-core
//!
//! Core traits and types shared by the cachebench request-interception layer.
//!
//! The interception layer sits between an application and the network and
//! answers every request according to one of four caching strategies. This
//! crate holds the vocabulary the other crates speak:
//!
//! - **Address** stored entries ([`RequestKey`])
//! - **Capture** responses for the store ([`StoredResponse`])
//! - **Report** where a response came from ([`ResponseOutcome`])
//! - **Select** a caching strategy ([`Strategy`])
//! - **Call** the network ([`Network`])
//! - **Extend** the lifetime of an intercepted request ([`Offload`], [`FetchEvent`])

pub mod event;
pub mod key;
pub mod network;
pub mod offload;
pub mod outcome;
pub mod snapshot;
pub mod strategy;

pub use event::FetchEvent;
pub use key::RequestKey;
pub use network::{Network, NetworkError, NetworkResult};
pub use offload::Offload;
pub use outcome::{ResponseOutcome, ResponseSource, SyntheticError};
pub use snapshot::StoredResponse;
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use strategy::{ParseStrategyError, Strategy};

/// Request type seen by the interception layer.
///
/// Bodies are fully buffered; `Bytes` keeps cloning cheap when a response is
/// both returned to the caller and written to the store.
pub type Request = http::Request<bytes::Bytes>;

/// Response type produced by the interception layer.
pub type Response = http::Response<bytes::Bytes>;
