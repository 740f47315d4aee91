//! Polling viewer for the Living Grid simulation.
//!
//! The simulation exposes its whole world as one JSON snapshot over HTTP.
//! This crate keeps a live picture of that world without any push channel:
//!
//! - **Snapshot fetcher** ([`source`], [`poller`]) -- cache-busted GETs on a
//!   self-throttling cadence, never more than one request in flight, with
//!   cooperative cancellation on teardown
//! - **Reconciler** ([`reconcile`]) -- compares each snapshot against the
//!   published state and keeps the previous state when nothing visible
//!   changed, so renderers can skip redundant work
//! - **Spatial renderer** ([`layout`], [`logs`], [`scroll`], [`present`]) --
//!   projects the published state onto the grid, classifies and styles the
//!   log lines, and follows the log tail only when it grows
//!
//! [`view`] ties the three together behind a mount / unmount lifecycle.
//!
//! # Architecture
//!
//! The poll task is the only writer. It publishes `Arc<DisplayState>`
//! values on a [`tokio::sync::watch`] channel; the render task borrows the
//! latest value and never mutates it. An unchanged snapshot leaves the
//! channel untouched, so "did anything change" is pointer identity on the
//! published `Arc`.

pub mod config;
pub mod error;
pub mod layout;
pub mod logs;
pub mod poller;
pub mod present;
pub mod reconcile;
pub mod scroll;
pub mod source;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export primary types for convenience.
pub use config::{ViewerConfig, ViewerSettings};
pub use error::ViewerError;
pub use layout::{GridGeometry, SceneLayout, render};
pub use logs::{LogCategory, LogPalette, classify};
pub use poller::{PollLifecycle, PollOutcome, PollStats, Poller};
pub use reconcile::{DisplayState, reconcile};
pub use scroll::LogViewport;
pub use source::{HttpSnapshotSource, SnapshotSource};
pub use view::View;
