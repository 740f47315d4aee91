//! View lifecycle: wires the fetcher to the renderer.
//!
//! Mounting spawns two tasks. The poll task owns the snapshot source and
//! the reconciler and publishes display states; the render task waits for a
//! newly published state, lays it out, and hands a text frame to the sink.
//! Unmounting cancels the shared [`PollLifecycle`] and waits for both.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::layout::{self, GridGeometry};
use crate::logs::LogPalette;
use crate::poller::{PollLifecycle, PollStats, Poller};
use crate::present;
use crate::reconcile::DisplayState;
use crate::scroll::LogViewport;
use crate::source::{HttpSnapshotSource, SnapshotSource};

/// A mounted view.
pub struct View {
    lifecycle: PollLifecycle,
    poll_task: JoinHandle<PollStats>,
    render_task: JoinHandle<()>,
}

impl View {
    /// Mount a view polling the configured HTTP endpoint.
    ///
    /// `on_frame` receives a freshly rendered text frame every time a new
    /// display state is published.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Http`] if the HTTP client cannot be built.
    pub fn mount<F>(config: &ViewerConfig, on_frame: F) -> Result<Self, ViewerError>
    where
        F: FnMut(String) + Send + 'static,
    {
        let source = HttpSnapshotSource::new(config.snapshot_url.clone(), config.request_timeout)?;
        Ok(Self::mount_with(source, config, on_frame))
    }

    /// Mount a view over any snapshot source.
    pub fn mount_with<S, F>(source: S, config: &ViewerConfig, on_frame: F) -> Self
    where
        S: SnapshotSource + 'static,
        F: FnMut(String) + Send + 'static,
    {
        let lifecycle = PollLifecycle::new();
        let (poller, published) = Poller::new(source, config.poll_interval, lifecycle.clone());

        let renderer = FrameRenderer {
            geometry: config.settings.grid,
            palette: config.settings.log_palette(),
            viewport: LogViewport::new(config.log_window_lines),
        };

        let poll_task = tokio::spawn(poller.run());
        let render_task = tokio::spawn(render_loop(
            published,
            lifecycle.clone(),
            renderer,
            on_frame,
        ));

        info!("view mounted");
        Self {
            lifecycle,
            poll_task,
            render_task,
        }
    }

    /// Whether the view is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_active()
    }

    /// Tear the view down and wait for its tasks to finish.
    ///
    /// A fetch in flight is allowed to settle; its result is discarded.
    pub async fn unmount(self) -> PollStats {
        self.lifecycle.cancel();

        let stats = match self.poll_task.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "poll task ended abnormally");
                PollStats::default()
            }
        };
        if let Err(e) = self.render_task.await {
            warn!(error = %e, "render task ended abnormally");
        }

        info!("view unmounted");
        stats
    }
}

/// Per-view rendering state.
struct FrameRenderer {
    geometry: GridGeometry,
    palette: LogPalette,
    viewport: LogViewport,
}

impl FrameRenderer {
    fn frame(&mut self, state: &DisplayState) -> String {
        let scene = layout::render(state, &self.geometry, &self.palette);
        if self.viewport.sync(&state.snapshot().logs) {
            debug!(top = self.viewport.top(), "log panel following tail");
        }
        present::render_text(&scene, &self.viewport)
    }
}

/// Render every newly published state until the view is torn down.
async fn render_loop<F>(
    mut published: watch::Receiver<Arc<DisplayState>>,
    lifecycle: PollLifecycle,
    mut renderer: FrameRenderer,
    mut on_frame: F,
) where
    F: FnMut(String) + Send + 'static,
{
    loop {
        tokio::select! {
            changed = published.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            () = lifecycle.cancelled() => break,
        }

        let state = Arc::clone(&published.borrow_and_update());
        if !lifecycle.is_active() {
            break;
        }
        if !state.is_populated() {
            continue;
        }
        on_frame(renderer.frame(&state));
    }
    debug!("render loop stopped");
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::layout::EMPTY_LOG_PLACEHOLDER;
    use crate::testing::{ScriptedSource, agent, snapshot};

    fn collecting() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) + Send + 'static) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let frames = Arc::clone(&frames);
            move |frame: String| frames.lock().unwrap().push(frame)
        };
        (frames, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn renders_once_per_published_state() {
        let mut harvested = snapshot(vec![agent("a", 1, 0)]);
        harvested.logs = vec![String::from("🎉 a harvested Wheat")];
        let source = ScriptedSource::new(
            vec![
                Ok(snapshot(vec![agent("a", 0, 0)])),
                Ok(snapshot(vec![agent("a", 0, 0)])),
            ],
            Duration::ZERO,
        )
        .with_fallback(harvested);
        let (frames, sink) = collecting();

        let view = View::mount_with(source, &ViewerConfig::default(), sink);
        tokio::time::sleep(Duration::from_millis(1_800)).await;
        let stats = view.unmount().await;

        let frames = frames.lock().unwrap();
        assert_eq!(stats.attempted, 4);
        assert_eq!(stats.published, 2);
        assert_eq!(stats.suppressed, 2);
        assert_eq!(frames.len(), 2);
        assert!(frames.first().unwrap().contains(EMPTY_LOG_PLACEHOLDER));
        assert!(frames.last().unwrap().contains("[harvest]"));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_do_not_blank_the_last_frame() {
        let source = ScriptedSource::new(
            vec![
                Ok(snapshot(vec![agent("a", 0, 0)])),
                Err(ViewerError::Status { status: 503 }),
            ],
            Duration::ZERO,
        )
        .with_fallback(snapshot(vec![agent("a", 0, 0)]));
        let (frames, sink) = collecting();

        let view = View::mount_with(source, &ViewerConfig::default(), sink);
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        let stats = view.unmount().await;

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.published, 1);
        assert_eq!(frames.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_before_first_response_renders_nothing() {
        let source = ScriptedSource::repeating(snapshot(vec![agent("a", 0, 0)]))
            .with_delay(Duration::from_secs(2));
        let (frames, sink) = collecting();

        let view = View::mount_with(source, &ViewerConfig::default(), sink);
        assert!(view.is_mounted());
        tokio::time::sleep(Duration::from_millis(300)).await;
        let stats = view.unmount().await;

        assert_eq!(stats.discarded, 1);
        assert!(frames.lock().unwrap().is_empty());
    }
}
