//! Offload trait for background task execution.
//!
//! This module provides the [`Offload`] trait which abstracts over
//! different implementations for running work that must finish before an
//! interception context is torn down, without the caller waiting for it.

use std::future::Future;

use smol_str::SmolStr;

/// Trait for spawning background tasks.
///
/// Policies use this to register store write-throughs and background
/// revalidations. The work starts running immediately and is tracked by the
/// implementation until it completes.
///
/// # Implementations
///
/// The primary implementation is `OffloadManager` in the `cachebench` crate,
/// which tracks spawned tasks so the host can wait for them at teardown.
///
/// # Clone bound
///
/// Implementors should use `Arc` internally to ensure all cloned instances
/// share the same configuration and state.
///
/// # Example
///
/// ```ignore
/// use cachebench_core::Offload;
///
/// fn offload_store_write<O: Offload>(offload: &O, url: String) {
///     offload.spawn("store_write", async move {
///         println!("Writing to store: {}", url);
///     });
/// }
/// ```
pub trait Offload: Send + Sync + Clone + 'static {
    /// Spawn a future to be executed in the background.
    ///
    /// # Arguments
    ///
    /// * `kind` - A label categorizing the task type (e.g., "revalidate", "store_write").
    ///   Used for metrics and tracing.
    /// * `future` - The future to execute in the background.
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
