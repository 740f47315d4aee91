//! Error types for the viewer.
//!
//! Every failure inside the poll loop is transient: it is logged and the
//! next poll is scheduled as usual. Only configuration errors surface to
//! `main`.

/// Errors that can occur while fetching snapshots or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The request never produced a response (connect, transport, timeout).
    #[error("snapshot request failed: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status.
    #[error("snapshot endpoint returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not a valid snapshot document.
    #[error("snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Failed to read the settings file from disk.
    #[error("failed to read settings file: {source}")]
    SettingsIo {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The settings file is not valid YAML for [`ViewerSettings`].
    ///
    /// [`ViewerSettings`]: crate::config::ViewerSettings
    #[error("failed to parse settings YAML: {source}")]
    SettingsYaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ViewerError {
    fn from(source: serde_yml::Error) -> Self {
        Self::SettingsYaml { source }
    }
}

impl ViewerError {
    /// Whether the error came from a single fetch and the poll loop should
    /// simply try again next interval.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. } | Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_are_transient() {
        let refused = ViewerError::Http(String::from("connection refused"));
        assert!(refused.is_transient());
        assert!(ViewerError::Status { status: 503 }.is_transient());
        assert!(!ViewerError::Config(String::from("bad")).is_transient());
    }

    #[test]
    fn status_message_names_the_code() {
        let err = ViewerError::Status { status: 502 };
        assert_eq!(err.to_string(), "snapshot endpoint returned HTTP 502");
    }
}
