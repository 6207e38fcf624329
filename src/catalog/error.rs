//! Error types for download list operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;

/// Errors that can occur while reading, writing or fetching download lists.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The list file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The list file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid download list.
    #[error("invalid download list {origin}: {source}")]
    Parse {
        /// File path or URL the document came from.
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing a list failed.
    #[error("failed to serialize download list: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Merge was asked for fewer than two lists.
    #[error("at least two lists are needed to merge, got {count}")]
    NotEnoughLists { count: usize },

    /// Fetching a list over HTTP failed.
    #[error("failed to fetch download list: {0}")]
    Fetch(#[from] DownloadError),

    /// No entry matched an index or title.
    #[error("no entry matches {query}")]
    EntryNotFound { query: String },
}

impl CatalogError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            origin: origin.into(),
            source,
        }
    }
}
