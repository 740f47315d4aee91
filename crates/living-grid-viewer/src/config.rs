//! Configuration for the viewer.
//!
//! Connection settings come from environment variables. Presentation
//! settings (grid geometry and log colors) live in an optional YAML file
//! whose path is itself given by `LIVING_GRID_CONFIG`; every field in it has
//! a default, so an empty file is valid.
//!
//! ```yaml
//! grid:
//!   size: 20
//!   cell_size: 25
//!   cell_gap: 2
//!   origin_offset: 10
//! palette:
//!   escape: { color: "#00ff00", weight: bold }
//!   move: { color: "#606060" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ViewerError;
use crate::layout::GridGeometry;
use crate::logs::{LogCategory, LogPalette, LogStyleOverride};

/// Endpoint used when `SNAPSHOT_URL` is unset.
pub const DEFAULT_SNAPSHOT_URL: &str = "http://127.0.0.1:8080/api/gamestate";

/// Poll interval used when `POLL_INTERVAL_MS` is unset.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Log panel height used when `LOG_WINDOW_LINES` is unset.
pub const DEFAULT_LOG_WINDOW_LINES: usize = 20;

/// Presentation settings loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ViewerSettings {
    /// Grid dimensions and overlay pixel metrics.
    #[serde(default)]
    pub grid: GridGeometry,
    /// Per-category log style overrides.
    #[serde(default)]
    pub palette: BTreeMap<LogCategory, LogStyleOverride>,
}

impl ViewerSettings {
    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::SettingsIo`] if the file cannot be read, or
    /// [`ViewerError::SettingsYaml`] if it is not valid settings YAML.
    pub fn from_file(path: &Path) -> Result<Self, ViewerError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse settings from a YAML string. Blank input yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::SettingsYaml`] if the string is not valid
    /// settings YAML, or [`ViewerError::Config`] if the grid has no cells.
    pub fn parse(yaml: &str) -> Result<Self, ViewerError> {
        let settings: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        if settings.grid.size == 0 {
            return Err(ViewerError::Config(String::from(
                "grid.size must be positive",
            )));
        }
        Ok(settings)
    }

    /// The log palette with overrides applied.
    pub fn log_palette(&self) -> LogPalette {
        LogPalette::with_overrides(&self.palette)
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// Snapshot endpoint, without the cache-busting parameter.
    pub snapshot_url: String,
    /// Pause between the end of one fetch and the start of the next.
    pub poll_interval: Duration,
    /// Optional per-request timeout.
    pub request_timeout: Option<Duration>,
    /// Log panel height in lines.
    pub log_window_lines: usize,
    /// Presentation settings.
    pub settings: ViewerSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            snapshot_url: String::from(DEFAULT_SNAPSHOT_URL),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            request_timeout: None,
            log_window_lines: DEFAULT_LOG_WINDOW_LINES,
            settings: ViewerSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `SNAPSHOT_URL` -- snapshot endpoint (default `http://127.0.0.1:8080/api/gamestate`)
    /// - `POLL_INTERVAL_MS` -- pause between polls in milliseconds (default 500)
    /// - `SNAPSHOT_TIMEOUT_MS` -- per-request timeout in milliseconds (default none)
    /// - `LOG_WINDOW_LINES` -- log panel height (default 20)
    /// - `LIVING_GRID_CONFIG` -- path to a presentation settings YAML file
    pub fn from_env() -> Result<Self, ViewerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ViewerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_url = lookup("SNAPSHOT_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_SNAPSHOT_URL));

        let poll_interval_ms: u64 = parse_var(&lookup, "POLL_INTERVAL_MS")?
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if poll_interval_ms == 0 {
            return Err(ViewerError::Config(String::from(
                "POLL_INTERVAL_MS must be positive",
            )));
        }

        let request_timeout = parse_var::<u64, _>(&lookup, "SNAPSHOT_TIMEOUT_MS")?
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let log_window_lines: usize = parse_var(&lookup, "LOG_WINDOW_LINES")?
            .unwrap_or(DEFAULT_LOG_WINDOW_LINES);
        if log_window_lines == 0 {
            return Err(ViewerError::Config(String::from(
                "LOG_WINDOW_LINES must be positive",
            )));
        }

        let settings = match lookup("LIVING_GRID_CONFIG") {
            Some(path) if !path.trim().is_empty() => ViewerSettings::from_file(Path::new(&path))?,
            _ => ViewerSettings::default(),
        };

        Ok(Self {
            snapshot_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout,
            log_window_lines,
            settings,
        })
    }
}

/// Parse an optional variable, failing on malformed values.
fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ViewerError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| ViewerError::Config(format!("invalid {name}: {e}")))
        })
        .transpose()
}
