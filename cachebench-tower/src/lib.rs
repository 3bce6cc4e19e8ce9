//! Tower middleware integration for the cachebench interception layer.
//!
//! This crate provides [`InterceptLayer`], a Tower [`Layer`] that answers
//! every request through one of the four caching strategies. The wrapped
//! service plays the role of the network: policies call it on misses and for
//! background revalidation.
//!
//! The resulting [`InterceptService`] never fails (`Error = Infallible`).
//! When neither the store nor the wrapped service can answer, the response is
//! a synthetic `408 Request Timeout`.
//!
//! # Quick Start
//!
//! ```ignore
//! use cachebench::Config;
//! use cachebench_tower::InterceptLayer;
//! use tower::{ServiceBuilder, ServiceExt, service_fn};
//!
//! let layer = InterceptLayer::builder()
//!     .config(Config::builder().strategy("stale-while-revalidate").build()?)
//!     .build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(layer)
//!     .service(service_fn(|_req| async {
//!         Ok::<_, std::convert::Infallible>(http::Response::new(bytes::Bytes::from("Hello")))
//!     }));
//!
//! // Start controlling requests, then switch strategies at runtime.
//! service.dispatcher().activate().await?;
//! service
//!     .dispatcher()
//!     .on_message_json(r#"{"type":"CHANGE_STRATEGY","strategy":"cache-first"}"#)
//!     .await?;
//! ```
//!
//! [`Layer`]: tower::Layer

mod future;
mod layer;
mod service;
pub mod upstream;

pub use future::InterceptFuture;
pub use layer::{InterceptLayer, InterceptLayerBuilder};
pub use service::InterceptService;
pub use upstream::TowerNetwork;
