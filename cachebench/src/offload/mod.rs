//! Background work registered by intercepted requests.
//!
//! Policies never await their store writes or background revalidations on
//! the response path. They hand the work to an [`OffloadManager`], which runs
//! it as tracked tokio tasks so the host can wait for everything to settle
//! before teardown.
//!
//! # Example
//!
//! ```ignore
//! use cachebench::offload::{OffloadManager, OffloadConfig};
//!
//! let manager = OffloadManager::new(OffloadConfig::default());
//!
//! manager.spawn("store_write", async {
//!     // write-through logic here
//! });
//!
//! manager.wait_all().await;
//! ```

mod manager;
mod policy;

pub use manager::{OffloadHandle, OffloadKey, OffloadManager};
pub use policy::{OffloadConfig, OffloadConfigBuilder, TimeoutPolicy};
