//! Test fixtures shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use living_grid_types::{Agent, AgentId, Resource, ResourceKind, Snapshot};
use tokio::time::Instant;

use crate::error::ViewerError;
use crate::source::SnapshotSource;

/// A living agent with an empty inventory.
pub fn agent(id: &str, x: i32, y: i32) -> Agent {
    Agent {
        id: AgentId::from(id),
        name: format!("agent-{id}"),
        x,
        y,
        is_alive: true,
        lifespan: 100,
        inventory: std::collections::BTreeMap::new(),
    }
}

/// A resource of `kind` at `(x, y)`.
pub const fn resource(x: i32, y: i32, kind: ResourceKind) -> Resource {
    Resource { x, y, kind }
}

/// A snapshot holding only `agents`.
pub fn snapshot(agents: Vec<Agent>) -> Snapshot {
    Snapshot {
        agents,
        ..Snapshot::default()
    }
}

#[derive(Debug, Default)]
struct CallLogInner {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    starts: Mutex<Vec<Instant>>,
}

/// Observes how a [`ScriptedSource`] was called.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    inner: Arc<CallLogInner>,
}

impl CallLog {
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> Vec<Instant> {
        self.inner.starts.lock().unwrap().clone()
    }
}

/// Replays scripted fetch results, then repeats a fallback snapshot.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Snapshot, ViewerError>>>,
    fallback: Snapshot,
    delay: Duration,
    call_log: CallLog,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Snapshot, ViewerError>>, delay: Duration) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Snapshot::default(),
            delay,
            call_log: CallLog::default(),
        }
    }

    pub fn repeating(snapshot: Snapshot) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: snapshot,
            delay: Duration::ZERO,
            call_log: CallLog::default(),
        }
    }

    pub fn with_fallback(mut self, snapshot: Snapshot) -> Self {
        self.fallback = snapshot;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_log(&self) -> CallLog {
        self.call_log.clone()
    }
}

impl SnapshotSource for ScriptedSource {
    async fn fetch(&self) -> Result<Snapshot, ViewerError> {
        let call_log = &self.call_log.inner;
        call_log.calls.fetch_add(1, Ordering::SeqCst);
        call_log.starts.lock().unwrap().push(Instant::now());
        let before = call_log.in_flight.fetch_add(1, Ordering::SeqCst);
        let now = before.saturating_add(1);
        call_log.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        call_log.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn describe(&self) -> String {
        String::from("scripted")
    }
}
