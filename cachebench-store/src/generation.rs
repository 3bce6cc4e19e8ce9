use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identifier of one store generation (one version epoch of the store).
///
/// Generation ids are configuration constants; nothing computes them at
/// runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(SmolStr);

impl GenerationId {
    /// Creates a generation id.
    pub fn new(id: impl Into<SmolStr>) -> Self {
        GenerationId(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GenerationId {
    fn from(id: &str) -> Self {
        GenerationId::new(id)
    }
}

impl From<String> for GenerationId {
    fn from(id: String) -> Self {
        GenerationId::new(id)
    }
}
