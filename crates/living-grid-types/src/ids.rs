//! Type-safe identifier wrapper for agents.
//!
//! The simulation assigns agent identities on its side (document store
//! object ids), so the viewer never generates them. The wrapper only exists
//! to keep identities from being mixed up with display names, which are
//! also plain strings on the wire.

use serde::{Deserialize, Serialize};

/// Stable identity of an agent, unique across the lifetime of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    /// Wrap a raw identifier string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for AgentId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
