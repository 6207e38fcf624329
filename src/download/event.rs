//! Progress and outcome notifications emitted by the workers.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use super::error::DownloadError;

/// Message carried by a cancelled outcome.
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// Progress of a plain file download.
#[derive(Debug, Clone, PartialEq)]
pub struct FileProgress {
    /// 0..=100; stays 0 when the server did not announce a length.
    pub percent: u8,
    /// Bytes written to the destination so far.
    pub bytes_downloaded: u64,
    /// Announced content length, 0 if unknown.
    pub total_bytes: u64,
    /// Average throughput since the task started.
    pub bytes_per_second: f64,
    /// Wall time since the task started.
    pub elapsed: Duration,
}

/// Progress of a torrent download, with swarm statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentProgress {
    pub percent: u8,
    pub download_rate_bps: u64,
    pub upload_rate_bps: u64,
    pub peers: u32,
    pub seeds: u32,
    pub bytes_done: u64,
    pub total_bytes: u64,
}

/// A progress snapshot; the shape depends on the kind of task.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    File(FileProgress),
    Torrent(TorrentProgress),
}

impl Progress {
    /// Percent complete, 0..=100.
    #[must_use]
    pub fn percent(&self) -> u8 {
        match self {
            Self::File(p) => p.percent,
            Self::Torrent(p) => p.percent,
        }
    }

    /// Bytes completed so far.
    #[must_use]
    pub fn bytes_done(&self) -> u64 {
        match self {
            Self::File(p) => p.bytes_downloaded,
            Self::Torrent(p) => p.bytes_done,
        }
    }

    /// Total bytes when known, 0 otherwise.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        match self {
            Self::File(p) => p.total_bytes,
            Self::Torrent(p) => p.total_bytes,
        }
    }
}

/// Failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required backend is missing; no work was attempted.
    CapabilityUnavailable,
    /// Connection, timeout, HTTP status or engine transport error.
    Network,
    /// The destination could not be written.
    Io,
}

/// Terminal result of a task. Exactly one is produced per task.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded { message: String },
    Cancelled,
    Failed { kind: FailureKind, message: String },
}

impl Outcome {
    /// Successful outcome with the given message.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::Succeeded {
            message: message.into(),
        }
    }

    /// Failed outcome carrying the error text verbatim.
    #[must_use]
    pub fn failed(error: &DownloadError) -> Self {
        Self::Failed {
            kind: error.failure_kind(),
            message: error.to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// True for user-initiated stops, so callers can skip error dialogs.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Succeeded { message } | Self::Failed { message, .. } => message,
            Self::Cancelled => CANCELLED_MESSAGE,
        }
    }
}

/// Notification delivered to the subscriber of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Progress(Progress),
    /// Always the last event of a task.
    Finished(Outcome),
}

/// Sending half of a task's notification channel.
///
/// Sends never fail from the worker's point of view: a subscriber that went
/// away simply stops receiving events.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<DownloadEvent>,
}

impl EventSink {
    #[must_use]
    pub fn new(tx: UnboundedSender<DownloadEvent>) -> Self {
        Self { tx }
    }

    pub fn progress(&self, progress: Progress) {
        let _ = self.tx.send(DownloadEvent::Progress(progress));
    }

    pub(crate) fn finish(&self, outcome: Outcome) {
        let _ = self.tx.send(DownloadEvent::Finished(outcome));
    }
}
