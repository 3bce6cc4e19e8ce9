//! Control channel messages.
//!
//! The host posts JSON messages to the interception layer to switch the
//! active strategy or drop every stored generation:
//!
//! ```json
//! {"type": "CHANGE_STRATEGY", "strategy": "cache-first"}
//! {"type": "CACHE_RESET"}
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ControlError;
use crate::lifecycle::ResetReport;

/// A message accepted on the control channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Replace the selected strategy name.
    ///
    /// The name is stored verbatim; names that match no strategy dispatch
    /// to the configured default.
    ChangeStrategy {
        /// Strategy name as sent by the host.
        strategy: SmolStr,
    },
    /// Delete every store generation. The strategy is left as is.
    CacheReset,
}

impl ControlMessage {
    /// Parses a control message from its JSON form.
    pub fn from_json(message: &str) -> Result<Self, ControlError> {
        serde_json::from_str(message).map_err(ControlError::Malformed)
    }

    /// Serialises the message to JSON.
    pub fn to_json(&self) -> String {
        // Both variants serialise to plain objects with string fields.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChangeStrategy { .. } => "CHANGE_STRATEGY",
            Self::CacheReset => "CACHE_RESET",
        }
    }
}

/// What applying a control message changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The selected strategy name was replaced.
    StrategyChanged {
        /// Previous name.
        from: SmolStr,
        /// New name.
        to: SmolStr,
    },
    /// Every generation was deleted.
    CacheReset(ResetReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_change_strategy() {
        let message =
            ControlMessage::from_json(r#"{"type":"CHANGE_STRATEGY","strategy":"cache-first"}"#)
                .unwrap();
        assert_eq!(
            message,
            ControlMessage::ChangeStrategy {
                strategy: "cache-first".into()
            }
        );
    }

    #[test]
    fn parses_cache_reset() {
        let message = ControlMessage::from_json(r#"{"type":"CACHE_RESET"}"#).unwrap();
        assert_eq!(message, ControlMessage::CacheReset);
        assert_eq!(message.to_json(), r#"{"type":"CACHE_RESET"}"#);
    }

    #[test]
    fn unknown_names_are_kept_verbatim() {
        let message =
            ControlMessage::from_json(r#"{"type":"CHANGE_STRATEGY","strategy":"bogus"}"#).unwrap();
        assert_eq!(
            message,
            ControlMessage::ChangeStrategy {
                strategy: "bogus".into()
            }
        );
    }

    #[test]
    fn rejects_malformed_messages() {
        for raw in [
            r#"{"type":"SHUTDOWN"}"#,
            r#"{"type":"CHANGE_STRATEGY"}"#,
            r#"{"strategy":"cache-first"}"#,
            "not json",
        ] {
            assert!(
                matches!(
                    ControlMessage::from_json(raw),
                    Err(ControlError::Malformed(_))
                ),
                "{raw} should be rejected"
            );
        }
    }
}
