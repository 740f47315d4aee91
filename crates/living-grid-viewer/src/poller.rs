//! Snapshot fetcher: the self-throttling poll loop.
//!
//! The loop fetches, reconciles, publishes, then sleeps a fixed interval
//! measured from the moment the fetch settled. A slow server therefore
//! slows the cadence down instead of piling requests up, and there is never
//! more than one request in flight.
//!
//! # Lifecycle
//!
//! [`PollLifecycle`] is a cooperative cancellation flag shared between the
//! loop and its owner. Cancelling wakes a sleeping loop immediately. A fetch
//! already in flight is not aborted; when it settles, its result is
//! discarded and nothing further is scheduled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use living_grid_types::Snapshot;
use tokio::sync::{Notify, watch};
use tracing::{debug, error, info, warn};

use crate::reconcile::{DisplayState, ReconcileOutcome, reconcile_detailed};
use crate::source::SnapshotSource;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct LifecycleInner {
    active: AtomicBool,
    cancel_notify: Notify,
}

/// Shared "still mounted" flag for the poll and render tasks.
#[derive(Debug, Clone)]
pub struct PollLifecycle {
    inner: Arc<LifecycleInner>,
}

impl PollLifecycle {
    /// A new, active lifecycle.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LifecycleInner {
                active: AtomicBool::new(true),
                cancel_notify: Notify::new(),
            }),
        }
    }

    /// Whether the view is still mounted.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Tear down: stop scheduling and wake anything waiting in
    /// [`cancelled`](Self::cancelled). Idempotent.
    pub fn cancel(&self) {
        self.inner.active.store(false, Ordering::Release);
        self.inner.cancel_notify.notify_waiters();
    }

    /// Resolve once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a cancel between the check and
            // the await is not lost.
            let notified = self.inner.cancel_notify.notified();
            if !self.is_active() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for PollLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// What a single [`Poller::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new display state was published.
    Published,
    /// The snapshot changed nothing observable.
    Suppressed,
    /// The fetch failed; it is retried next interval.
    Failed,
    /// The view was torn down while the fetch was in flight.
    Discarded,
}

/// Counters for one poll loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Fetches started.
    pub attempted: u64,
    /// Snapshots that replaced the display state.
    pub published: u64,
    /// Snapshots that changed nothing.
    pub suppressed: u64,
    /// Fetches that failed.
    pub failed: u64,
    /// Fetches that settled after teardown.
    pub discarded: u64,
}

impl PollStats {
    const fn record(&mut self, outcome: PollOutcome) {
        let counter = match outcome {
            PollOutcome::Published => &mut self.published,
            PollOutcome::Suppressed => &mut self.suppressed,
            PollOutcome::Failed => &mut self.failed,
            PollOutcome::Discarded => &mut self.discarded,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Polls a [`SnapshotSource`] and publishes reconciled display states.
///
/// Published states go out on a [`watch`] channel. Receivers only see a
/// change when the reconciler actually replaced the state, so a renderer
/// awaiting `changed()` re-runs exactly when there is something new to
/// draw.
pub struct Poller<S> {
    source: S,
    interval: Duration,
    lifecycle: PollLifecycle,
    published: watch::Sender<Arc<DisplayState>>,
    stats: PollStats,
}

impl<S: SnapshotSource> Poller<S> {
    /// Create a poller and the receiver for its published states.
    ///
    /// The receiver starts out holding the empty, unpopulated state.
    pub fn new(
        source: S,
        interval: Duration,
        lifecycle: PollLifecycle,
    ) -> (Self, watch::Receiver<Arc<DisplayState>>) {
        let (published, receiver) = watch::channel(Arc::new(DisplayState::empty()));
        let poller = Self {
            source,
            interval,
            lifecycle,
            published,
            stats: PollStats::default(),
        };
        (poller, receiver)
    }

    /// Counters so far.
    pub const fn stats(&self) -> PollStats {
        self.stats
    }

    /// The display state currently published.
    pub fn current(&self) -> Arc<DisplayState> {
        Arc::clone(&self.published.borrow())
    }

    /// Fetch once, reconcile, and publish if the state changed.
    ///
    /// Never fails: fetch errors are logged and reported as
    /// [`PollOutcome::Failed`].
    pub async fn poll(&mut self) -> PollOutcome {
        self.stats.attempted = self.stats.attempted.saturating_add(1);
        let result = self.source.fetch().await;

        let outcome = if self.lifecycle.is_active() {
            match result {
                Ok(snapshot) => self.publish(snapshot),
                Err(e) if e.is_transient() => {
                    warn!(
                        source = self.source.describe(),
                        error = %e,
                        "snapshot fetch failed, retrying next interval"
                    );
                    PollOutcome::Failed
                }
                Err(e) => {
                    error!(
                        source = self.source.describe(),
                        error = %e,
                        "snapshot source misconfigured, retrying next interval"
                    );
                    PollOutcome::Failed
                }
            }
        } else {
            debug!("view torn down while fetching, discarding result");
            PollOutcome::Discarded
        };

        self.stats.record(outcome);
        outcome
    }

    /// Reconcile a fetched snapshot and publish it if it changed anything.
    fn publish(&self, snapshot: Snapshot) -> PollOutcome {
        let previous = self.current();
        let (next, decision) = reconcile_detailed(&previous, snapshot);
        match decision {
            ReconcileOutcome::Accepted(changes) => {
                debug!(
                    first = changes.first,
                    agents_changed = changes.agents,
                    resources_changed = changes.resources,
                    logs_changed = changes.logs,
                    "display state replaced"
                );
                self.published.send_replace(next);
                PollOutcome::Published
            }
            ReconcileOutcome::Suppressed => {
                debug!("snapshot unchanged, update suppressed");
                PollOutcome::Suppressed
            }
        }
    }

    /// Run the poll loop until the lifecycle is cancelled.
    ///
    /// The next poll starts `interval` after the previous one settled.
    /// Returns the loop's counters.
    pub async fn run(mut self) -> PollStats {
        info!(
            source = self.source.describe(),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "poll loop started"
        );

        while self.lifecycle.is_active() {
            self.poll().await;
            if !self.lifecycle.is_active() {
                break;
            }
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = self.lifecycle.cancelled() => break,
            }
        }

        info!(
            attempted = self.stats.attempted,
            published = self.stats.published,
            suppressed = self.stats.suppressed,
            failed = self.stats.failed,
            discarded = self.stats.discarded,
            "poll loop stopped"
        );
        self.stats
    }
}
