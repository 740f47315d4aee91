//! Snapshot sources.
//!
//! [`SnapshotSource`] is the seam between the poll loop and the network.
//! The production implementation is [`HttpSnapshotSource`], which issues a
//! cache-busted `GET` against the simulation's state endpoint.

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;
use living_grid_types::Snapshot;
use tracing::debug;

use crate::error::ViewerError;

/// Query parameter carrying the cache-busting token.
pub const CACHE_BUST_PARAM: &str = "_t";

/// Anything that can produce the current simulation snapshot.
pub trait SnapshotSource: Send + Sync {
    /// Fetch one snapshot.
    ///
    /// # Errors
    ///
    /// Any error is treated as transient by the poll loop.
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, ViewerError>> + Send;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Fetches snapshots over HTTP with `reqwest`.
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    endpoint: String,
    last_token: AtomicI64,
}

impl HttpSnapshotSource {
    /// Create a source for `endpoint`.
    ///
    /// `timeout` bounds each request. `None` leaves requests unbounded, in
    /// which case a hung request simply delays the next poll.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Http`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ViewerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(limit) = timeout {
            builder = builder.timeout(limit);
        }
        let client = builder
            .build()
            .map_err(|e| ViewerError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            last_token: AtomicI64::new(0),
        })
    }

    /// The configured endpoint, without query parameters.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Next cache-busting token.
    ///
    /// Wall-clock milliseconds, bumped past the previous token when the
    /// clock has not advanced (or went backwards), so tokens strictly
    /// increase for the lifetime of the source.
    pub fn next_token(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_token
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(advance_token(last, now))
            })
            .unwrap_or_else(|last| last);
        advance_token(previous, now)
    }
}

/// The token that follows `last` at wall-clock time `now`.
const fn advance_token(last: i64, now: i64) -> i64 {
    let bumped = last.saturating_add(1);
    if now > bumped { now } else { bumped }
}

impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<Snapshot, ViewerError> {
        let token = self.next_token();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[(CACHE_BUST_PARAM, token)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ViewerError::Http(format!("GET {} failed: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                ViewerError::Http(format!("reading body from {} failed: {e}", self.endpoint))
            })?;

        let snapshot: Snapshot = serde_json::from_slice(&body)?;
        debug!(
            token = token,
            agents = snapshot.agents.len(),
            resources = snapshot.resources.len(),
            exits = snapshot.exits.len(),
            logs = snapshot.logs.len(),
            "snapshot fetched"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("http {}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn token_tracks_the_clock_when_it_moves() {
        assert_eq!(advance_token(100, 5_000), 5_000);
    }

    #[test]
    fn token_bumps_when_the_clock_stalls_or_rewinds() {
        assert_eq!(advance_token(5_000, 5_000), 5_001);
        assert_eq!(advance_token(5_000, 4_000), 5_001);
    }

    #[test]
    fn tokens_strictly_increase() {
        let source = HttpSnapshotSource::new("http://127.0.0.1:9/api/gamestate", None).unwrap();
        let mut last = source.next_token();
        for _ in 0..1_000 {
            let next = source.next_token();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn describes_its_endpoint() {
        let source = HttpSnapshotSource::new("http://sim.local/api/gamestate", None).unwrap();
        assert_eq!(source.endpoint(), "http://sim.local/api/gamestate");
        assert_eq!(source.describe(), "http http://sim.local/api/gamestate");
    }
}
