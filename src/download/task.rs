//! Download task description and source classification.

use std::path::{Path, PathBuf};

/// What kind of transfer a source needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Plain HTTP(S) file.
    File,
    /// `magnet:` URI or `.torrent` link.
    Torrent,
}

impl TaskKind {
    /// Classifies a source URI.
    ///
    /// Magnet URIs and anything ending in `.torrent` (query string ignored)
    /// are torrents; everything else is a file.
    #[must_use]
    pub fn classify(source: &str) -> Self {
        let source = source.trim();
        if source
            .get(..7)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("magnet:"))
        {
            return Self::Torrent;
        }
        let without_query = source.split(['?', '#']).next().unwrap_or(source);
        if without_query.to_ascii_lowercase().ends_with(".torrent") {
            Self::Torrent
        } else {
            Self::File
        }
    }
}

/// One download, immutable once a worker starts it.
///
/// For [`TaskKind::File`] the destination is the output file path; for
/// [`TaskKind::Torrent`] it is the directory the engine saves into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    source: String,
    destination: PathBuf,
    kind: TaskKind,
}

impl DownloadTask {
    /// Creates a task, classifying the source.
    pub fn new(source: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let kind = TaskKind::classify(&source);
        Self {
            source,
            destination: destination.into(),
            kind,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }
}
