//! Traits and structs for the durable response store.
//!
//! The store is organised in generations. Exactly one generation is current
//! at a time (its id is configuration); every other generation is garbage
//! left over from an earlier version and gets purged on activation.
//!
//! If you want to plug in your own storage, implement [`Store`].
mod generation;
mod memory;
mod store;

pub use generation::GenerationId;
pub use memory::{MemoryStore, MemoryStoreBuilder};
pub use store::{Store, StoreResult};

use http::Method;
use thiserror::Error;

/// Describes the groups of errors a store can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or computation error.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    /// The write would push the store over its byte quota.
    #[error("store quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded {
        /// Bytes the write would add.
        needed: u64,
        /// Bytes still free under the quota.
        available: u64,
    },
    /// Only `GET` requests can address stored entries.
    #[error("request method `{0}` is unsupported by the store")]
    UnsupportedMethod(Method),
}

/// Status of deleting result.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Generation deleted along with this many entries.
    Deleted(u32),
    /// Generation already missing.
    Missing,
}
