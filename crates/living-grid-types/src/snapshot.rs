//! The snapshot payload returned by the simulation's state query.
//!
//! A [`Snapshot`] is one immutable description of the whole world at an
//! instant. The simulation's schema grows additively, so every collection
//! tolerates being absent or `null` and unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::AgentId;

/// Well-known inventory item kinds.
pub mod items {
    /// The weapon item. Holding one makes an agent armed.
    pub const AXE: &str = "Axe";
    /// Food consumed each turn to regain health.
    pub const WHEAT: &str = "Wheat";
    /// Crafting material for axes.
    pub const STONE: &str = "Stone";
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Full simulation state at one instant.
///
/// Order inside each collection is whatever the simulation returned. The
/// viewer relies on agent order only for fingerprinting and key stability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every agent the simulation still tracks, alive or dead.
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<Agent>,
    /// Harvestable resources on the grid.
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<Resource>,
    /// Exit cells.
    #[serde(default, deserialize_with = "null_as_default")]
    pub exits: Vec<Exit>,
    /// Event log lines, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub logs: Vec<String>,
}

impl Snapshot {
    /// Iterate over agents with `is_alive` set, in snapshot order.
    pub fn live_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|agent| agent.is_alive)
    }

    /// Number of living agents.
    pub fn live_agent_count(&self) -> usize {
        self.live_agents().count()
    }

    /// The most recent log line, if any.
    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// An autonomous agent on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable identity.
    pub id: AgentId,
    /// Display label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Column, `0 <= x < grid_size`.
    pub x: i32,
    /// Row, `0 <= y < grid_size`. Rows grow downward.
    pub y: i32,
    /// Whether the agent is still alive.
    #[serde(rename = "isAlive", default)]
    pub is_alive: bool,
    /// Remaining health.
    #[serde(default)]
    pub lifespan: i32,
    /// Item kind to count.
    #[serde(default, deserialize_with = "null_as_default")]
    pub inventory: BTreeMap<String, i64>,
}

impl Agent {
    /// Count of `kind` in the inventory, zero when absent.
    pub fn item_count(&self, kind: &str) -> i64 {
        self.inventory.get(kind).copied().unwrap_or(0)
    }

    /// Whether the inventory holds a positive count of `kind`.
    pub fn holds(&self, kind: &str) -> bool {
        self.item_count(kind) > 0
    }
}

// ---------------------------------------------------------------------------
// Resource / Exit
// ---------------------------------------------------------------------------

/// Kind of a harvestable resource.
///
/// The simulation currently spawns wheat and stone. Any other name is kept
/// verbatim so a new resource type never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceKind {
    /// Food.
    Wheat,
    /// Crafting material.
    Stone,
    /// A kind this viewer does not know by name.
    Other(String),
}

impl ResourceKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wheat => items::WHEAT,
            Self::Stone => items::STONE,
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            items::WHEAT => Self::Wheat,
            items::STONE => Self::Stone,
            _ => Self::Other(name),
        }
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A harvestable resource occupying one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// What can be harvested here.
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

/// An exit cell agents can escape through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// Deserialize `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_collaborator_payload() {
        let json = r#"{
            "agents": [
                {"id": "a1", "name": "Alice", "x": 3, "y": 4, "lifespan": 42,
                 "isAlive": true, "inventory": {"Axe": 1, "Wheat": 2}}
            ],
            "resources": [{"id": "r1", "type": "Wheat", "x": 1, "y": 1}],
            "exits": [{"id": "e1", "x": 19, "y": 0}],
            "logs": ["----- round -----"]
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let agent = snapshot.agents.first().unwrap();
        assert_eq!(agent.id, AgentId::from("a1"));
        assert!(agent.is_alive);
        assert!(agent.holds(items::AXE));
        assert_eq!(agent.item_count(items::WHEAT), 2);
        assert_eq!(
            snapshot.resources.first().map(|r| &r.kind),
            Some(&ResourceKind::Wheat)
        );
        assert_eq!(snapshot.exits, vec![Exit { x: 19, y: 0 }]);
        assert_eq!(snapshot.last_log(), Some("----- round -----"));
    }

    #[test]
    fn absent_and_null_collections_are_empty() {
        let json = r#"{"agents": [], "resources": null, "logs": []}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.exits.is_empty());
        assert!(snapshot.resources.is_empty());

        let bare: Snapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(bare, Snapshot::default());
    }

    #[test]
    fn agent_without_inventory_holds_nothing() {
        let json = r#"{"id": "a2", "x": 0, "y": 0, "isAlive": true, "inventory": null}"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert!(!agent.holds(items::AXE));
        assert!(agent.name.is_empty());
    }

    #[test]
    fn unknown_resource_kind_is_preserved() {
        let json = r#"{"type": "Crystal", "x": 2, "y": 5}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.kind, ResourceKind::Other("Crystal".to_owned()));
        let back = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            back.get("type").and_then(serde_json::Value::as_str),
            Some("Crystal")
        );
    }

    #[test]
    fn live_agents_skip_the_dead() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"agents": [
                {"id": "a", "x": 0, "y": 0, "isAlive": true},
                {"id": "b", "x": 1, "y": 0, "isAlive": false},
                {"id": "c", "x": 2, "y": 0, "isAlive": true}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = snapshot.live_agents().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(snapshot.live_agent_count(), 2);
    }
}
