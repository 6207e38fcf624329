//! Error types for the download module.
//!
//! Every failure inside a worker is converted into a terminal
//! [`Outcome`](super::Outcome); these errors carry the context-rich message
//! that ends up in it.

use std::path::PathBuf;

use thiserror::Error;

use super::event::FailureKind;

/// Errors that can occur while running a download task.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A backend the task needs is not present in this build or runtime.
    #[error("{capability} is not available")]
    CapabilityUnavailable {
        /// Human readable name of the missing backend.
        capability: &'static str,
    },

    /// The torrent engine rejected a request or reported an error state.
    #[error("torrent engine error for {source_uri}: {message}")]
    Engine {
        /// The magnet or torrent URI being processed.
        source_uri: String,
        /// Message reported by the engine.
        message: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            return Self::Timeout { url };
        }
        Self::Network { url, source }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a capability error for a missing backend.
    #[must_use]
    pub fn capability_unavailable(capability: &'static str) -> Self {
        Self::CapabilityUnavailable { capability }
    }

    /// Creates a torrent engine error.
    pub fn engine(source_uri: impl Into<String>, message: impl ToString) -> Self {
        Self::Engine {
            source_uri: source_uri.into(),
            message: message.to_string(),
        }
    }

    /// Classifies the error into the failure taxonomy reported to callers.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::CapabilityUnavailable { .. } => FailureKind::CapabilityUnavailable,
            Self::Io { .. } => FailureKind::Io,
            Self::Network { .. }
            | Self::Timeout { .. }
            | Self::HttpStatus { .. }
            | Self::InvalidUrl { .. }
            | Self::Engine { .. } => FailureKind::Network,
        }
    }
}
