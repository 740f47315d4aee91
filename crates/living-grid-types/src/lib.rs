//! Wire types for the Living Grid viewer.
//!
//! The simulation exposes a single read-only query that returns the whole
//! world as one JSON document. This crate mirrors that document so the
//! viewer can deserialize it without knowing anything about the rules that
//! produced it.
//!
//! # Modules
//!
//! - [`ids`] -- Identity wrapper for agents
//! - [`snapshot`] -- The snapshot payload and the entities inside it

pub mod ids;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use ids::AgentId;
pub use snapshot::{Agent, Exit, Resource, ResourceKind, Snapshot, items};
