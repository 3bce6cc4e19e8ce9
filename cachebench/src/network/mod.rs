//! Network adapters.

mod conditions;

pub use conditions::{ConditionedNetwork, NetworkCondition};
