//! Caching strategy identifiers.
//!
//! Strategies travel over the control channel as kebab-case names
//! (`"network-first"`, `"cache-first"`, `"stale-while-revalidate"`,
//! `"cache-then-network"`). Parsing is strict; deciding what to do with an
//! unknown name is the dispatcher's job.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four caching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Network first, store on transport failure.
    #[default]
    NetworkFirst,
    /// Store first, network on miss.
    CacheFirst,
    /// Stored entry immediately, refresh the store in the background.
    StaleWhileRevalidate,
    /// Store and network started together, store preferred.
    CacheThenNetwork,
}

impl Strategy {
    /// Every strategy, in benchmark order.
    pub const ALL: [Strategy; 4] = [
        Strategy::NetworkFirst,
        Strategy::CacheFirst,
        Strategy::StaleWhileRevalidate,
        Strategy::CacheThenNetwork,
    ];

    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkFirst => "network-first",
            Self::CacheFirst => "cache-first",
            Self::StaleWhileRevalidate => "stale-while-revalidate",
            Self::CacheThenNetwork => "cache-then-network",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name does not match any [`Strategy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown caching strategy `{0}`")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| ParseStrategyError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>(), Ok(strategy));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "cache-only".parse::<Strategy>().unwrap_err();
        assert_eq!(err.to_string(), "unknown caching strategy `cache-only`");
    }
}
