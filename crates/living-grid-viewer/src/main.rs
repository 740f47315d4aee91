//! Terminal viewer binary for the Living Grid simulation.
//!
//! Polls the simulation's snapshot endpoint and redraws the grid and the
//! log panel in the terminal whenever something visible changed.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing, on stderr)
//! 2. Load configuration from the environment
//! 3. Mount the view
//! 4. Wait for Ctrl-C, then unmount and log the poll counters

use std::io::Write as _;

use living_grid_viewer::{View, ViewerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Clear the screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Application entry point for the viewer.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the HTTP client cannot be
/// built, or the Ctrl-C handler cannot be installed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging. Frames own stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("living-grid-viewer starting");

    // 2. Load configuration.
    let config = ViewerConfig::from_env()?;
    info!(
        snapshot_url = config.snapshot_url,
        poll_interval_ms = u64::try_from(config.poll_interval.as_millis()).unwrap_or(u64::MAX),
        log_window_lines = config.log_window_lines,
        grid_size = config.settings.grid.size,
        "Configuration loaded"
    );

    // 3. Mount the view.
    let view = View::mount(&config, |frame| {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = write!(stdout, "{CLEAR_SCREEN}{frame}").and_then(|()| stdout.flush()) {
            warn!(error = %e, "failed to draw frame");
        }
    })?;

    // 4. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("interrupt received, shutting down");

    let stats = view.unmount().await;
    info!(
        attempted = stats.attempted,
        published = stats.published,
        suppressed = stats.suppressed,
        failed = stats.failed,
        "living-grid-viewer stopped"
    );
    Ok(())
}
