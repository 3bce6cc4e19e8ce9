//! Dispatcher configuration.
//!
//! Configuration is usually loaded from YAML:
//!
//! ```yaml
//! generation: cachebench-v2
//! default_strategy: network-first
//! strategy: stale-while-revalidate
//! offload:
//!   timeout:
//!     warn: 5s
//! network:
//!   slow:
//!     latency: 300ms
//! ```
//!
//! Every field is optional.

use cachebench_core::Strategy;
use cachebench_store::GenerationId;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::network::NetworkCondition;
use crate::offload::OffloadConfig;

/// Generation written to when none is configured.
pub const DEFAULT_GENERATION: &str = "cachebench-v1";

fn default_generation() -> GenerationId {
    GenerationId::new(DEFAULT_GENERATION)
}

/// Configuration of a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Current store generation. Bump it to invalidate everything stored by
    /// earlier runs on the next activation.
    #[serde(default = "default_generation")]
    pub generation: GenerationId,
    /// Strategy used when the selected name matches no strategy.
    #[serde(default)]
    pub default_strategy: Strategy,
    /// Initially selected strategy name. Defaults to `default_strategy`.
    #[serde(default)]
    pub strategy: Option<SmolStr>,
    /// Background work settings.
    #[serde(default)]
    pub offload: OffloadConfig,
    /// Simulated network condition applied to every fetch.
    #[serde(default)]
    pub network: Option<NetworkCondition>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            generation: default_generation(),
            default_strategy: Strategy::default(),
            strategy: None,
            offload: OffloadConfig::default(),
            network: None,
        }
    }
}

impl Config {
    /// Create a new builder for Config.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()
    }

    /// Name selected at startup.
    pub fn initial_strategy(&self) -> SmolStr {
        self.strategy
            .clone()
            .unwrap_or_else(|| SmolStr::new_static(self.default_strategy.as_str()))
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.generation.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyGeneration);
        }
        Ok(self)
    }
}

/// Builder for Config.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the current generation.
    pub fn generation(mut self, generation: impl Into<GenerationId>) -> Self {
        self.config.generation = generation.into();
        self
    }

    /// Set the fallback strategy.
    pub fn default_strategy(mut self, strategy: Strategy) -> Self {
        self.config.default_strategy = strategy;
        self
    }

    /// Set the initially selected strategy name.
    pub fn strategy(mut self, name: impl Into<SmolStr>) -> Self {
        self.config.strategy = Some(name.into());
        self
    }

    /// Set background work settings.
    pub fn offload(mut self, offload: OffloadConfig) -> Self {
        self.config.offload = offload;
        self
    }

    /// Set a simulated network condition.
    pub fn network(mut self, condition: NetworkCondition) -> Self {
        self.config.network = Some(condition);
        self
    }

    /// Validate and build the Config.
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()
    }
}
