//! Reconciler: decides whether an incoming snapshot replaces the display.
//!
//! Every poll brings a complete snapshot, but most of them change nothing a
//! viewer could see. Replacing the displayed state anyway would restart
//! every in-flight agent animation twice a second. The reconciler compares
//! cheap fingerprints and hands back the previous [`DisplayState`] (the very
//! same [`Arc`]) when nothing observable moved.
//!
//! Suppression is only an optimization. The next snapshot that differs is
//! always accepted in full, so the display can lag by at most one change.

use std::sync::{Arc, OnceLock};

use living_grid_types::Snapshot;

use crate::layout::GridIndex;

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Identity and position of every living agent, in snapshot order.
///
/// Encoded as one string of `<id length>:<id>@<x>,<y>;` records. The length
/// prefix keeps the encoding injective whatever characters ids contain.
/// Dead agents are left out, so a death changes the fingerprint whether the
/// simulation flips `isAlive` or drops the agent from the collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AgentFingerprint(String);

impl AgentFingerprint {
    /// Fingerprint the live agent population of a snapshot.
    pub fn of(snapshot: &Snapshot) -> Self {
        let mut encoded = String::with_capacity(snapshot.agents.len().saturating_mul(24));
        for agent in snapshot.live_agents() {
            let id = agent.id.as_str();
            encoded.push_str(&format!("{}:{id}@{},{};", id.len(), agent.x, agent.y));
        }
        Self(encoded)
    }

    /// The encoded form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// DisplayState
// ---------------------------------------------------------------------------

/// The published view of the latest accepted snapshot.
///
/// Immutable once built. A new instance replaces the old one when the
/// reconciler accepts a snapshot; otherwise the old `Arc` keeps being
/// shared, which is how renderers know nothing changed.
#[derive(Debug, Default)]
pub struct DisplayState {
    snapshot: Snapshot,
    fingerprint: AgentFingerprint,
    populated: bool,
    grid_index: OnceLock<GridIndex>,
}

impl DisplayState {
    /// The state before any snapshot has been accepted.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Promote a snapshot to a published state.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let fingerprint = AgentFingerprint::of(&snapshot);
        Self::with_fingerprint(snapshot, fingerprint)
    }

    const fn with_fingerprint(snapshot: Snapshot, fingerprint: AgentFingerprint) -> Self {
        Self {
            snapshot,
            fingerprint,
            populated: true,
            grid_index: OnceLock::new(),
        }
    }

    /// The accepted snapshot.
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Cached fingerprint of the accepted snapshot.
    pub const fn fingerprint(&self) -> &AgentFingerprint {
        &self.fingerprint
    }

    /// Whether a snapshot has ever been accepted.
    pub const fn is_populated(&self) -> bool {
        self.populated
    }

    /// Coordinate index of exits and resources, built on first use.
    pub fn grid_index(&self) -> &GridIndex {
        self.grid_index
            .get_or_init(|| GridIndex::build(&self.snapshot))
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Which observable aspects differ between two states.
#[allow(
    clippy::struct_excessive_bools,
    reason = "independent flags reported together for logging"
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Nothing had been published before.
    pub first: bool,
    /// Live agent identities or positions differ.
    pub agents: bool,
    /// Resource count differs.
    pub resources: bool,
    /// Log count or final log line differs.
    pub logs: bool,
}

impl ChangeSet {
    /// Whether anything changed.
    pub const fn any(&self) -> bool {
        self.first || self.agents || self.resources || self.logs
    }
}

/// Result of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The incoming snapshot became the new state.
    Accepted(ChangeSet),
    /// Nothing observable changed; the previous state was kept.
    Suppressed,
}

impl ReconcileOutcome {
    /// What changed, if the snapshot was accepted.
    pub const fn changes(self) -> Option<ChangeSet> {
        match self {
            Self::Accepted(changes) => Some(changes),
            Self::Suppressed => None,
        }
    }
}

/// Compare a published state against an incoming snapshot.
///
/// Resources and logs are compared by count: in practice resources only
/// deplete and logs only grow, so a content change shows up as a count
/// change. The simulation keeps a bounded log window, though, and once the
/// window is full its length stops moving; the final line is compared too
/// so a sliding window still registers.
pub fn diff(
    previous: &DisplayState,
    incoming: &Snapshot,
    fingerprint: &AgentFingerprint,
) -> ChangeSet {
    let shown = previous.snapshot();
    ChangeSet {
        first: !previous.is_populated(),
        agents: previous.fingerprint() != fingerprint,
        resources: shown.resources.len() != incoming.resources.len(),
        logs: shown.logs.len() != incoming.logs.len() || shown.last_log() != incoming.last_log(),
    }
}

/// Decide the next display state and report why.
pub fn reconcile_detailed(
    previous: &Arc<DisplayState>,
    incoming: Snapshot,
) -> (Arc<DisplayState>, ReconcileOutcome) {
    let fingerprint = AgentFingerprint::of(&incoming);
    let changes = diff(previous, &incoming, &fingerprint);
    if !changes.any() {
        return (Arc::clone(previous), ReconcileOutcome::Suppressed);
    }

    let next = DisplayState::with_fingerprint(incoming, fingerprint);
    (Arc::new(next), ReconcileOutcome::Accepted(changes))
}

/// Decide the next display state.
///
/// Returns `previous` itself when the incoming snapshot is observably
/// identical, and the whole incoming snapshot otherwise. Partial merges are
/// never made: the simulation's snapshot is internally consistent, a mix of
/// two snapshots might not be.
pub fn reconcile(previous: &Arc<DisplayState>, incoming: Snapshot) -> Arc<DisplayState> {
    reconcile_detailed(previous, incoming).0
}
