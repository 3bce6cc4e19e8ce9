//! Errors surfaced by the interception layer.
//!
//! Request handling itself never fails; these cover the control channel,
//! configuration loading and store lifecycle transitions.

use cachebench_store::StoreError;

/// A control message could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The message was not one of the recognised shapes.
    #[error("malformed control message: {0}")]
    Malformed(#[source] serde_json::Error),
    /// A reset was requested but the store refused to drop a generation.
    #[error("cache reset failed")]
    Reset(#[from] LifecycleError),
}

/// A lifecycle transition failed part-way.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The store could not enumerate or delete generations.
    #[error("store error during lifecycle transition: {0}")]
    Store(#[from] StoreError),
}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The YAML document did not match the configuration schema.
    #[error("invalid configuration: {0}")]
    Yaml(String),
    /// The configured generation id is empty.
    #[error("generation id must not be empty")]
    EmptyGeneration,
}
