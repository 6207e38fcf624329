//! Worker that downloads a magnet or `.torrent` link through a torrent engine.
//!
//! The engine sits behind two traits so the polling logic does not depend on
//! a particular library:
//!
//! - [`TorrentBackend`] opens one [`TorrentSession`] per task.
//! - [`TorrentSession`] adds, polls and removes a single torrent.
//!
//! With the `torrent` cargo feature the default backend is librqbit;
//! without it [`TorrentWorker::with_default_backend`] yields a worker that
//! fails every task immediately with `CapabilityUnavailable`.

#[cfg(feature = "torrent")]
mod rqbit;

use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::cancel::CancelToken;
use super::constants::{METADATA_POLL_INTERVAL, STATUS_POLL_INTERVAL, TORRENT_LISTEN_PORT};
use super::error::DownloadError;
use super::event::{EventSink, Outcome, Progress, TorrentProgress};
use super::task::DownloadTask;

#[cfg(feature = "torrent")]
pub use rqbit::RqbitBackend;

/// Engine-assigned identifier of a torrent within a session.
pub type TorrentId = usize;

/// Name used in capability errors.
const CAPABILITY: &str = "torrent engine";

/// Lifecycle state as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentState {
    CheckingFiles,
    Downloading,
    Finished,
    Seeding,
}

impl TorrentState {
    /// Finished and seeding both end the download phase.
    #[must_use]
    pub fn is_download_complete(self) -> bool {
        matches!(self, Self::Finished | Self::Seeding)
    }
}

/// One status poll of a torrent.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentStatus {
    pub state: TorrentState,
    /// Completion ratio in 0.0..=1.0.
    pub progress: f64,
    pub download_rate_bps: u64,
    pub upload_rate_bps: u64,
    pub peers: u32,
    pub seeds: u32,
    pub bytes_done: u64,
    /// Set when the engine put the torrent into an error state.
    pub error: Option<String>,
}

/// Session and polling settings for the torrent worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentConfig {
    /// Port the session listens on (all interfaces).
    pub listen_port: u16,
    pub metadata_poll_interval: Duration,
    pub status_poll_interval: Duration,
}

impl TorrentConfig {
    /// The single-port range the session binds, as a half-open range.
    ///
    /// # Errors
    ///
    /// Port 65535 cannot be expressed as a half-open `u16` range.
    pub fn listen_port_range(&self) -> Result<Range<u16>, DownloadError> {
        let port = self.listen_port;
        port.checked_add(1).map(|end| port..end).ok_or_else(|| {
            DownloadError::engine(format!("port {port}"), "listen port must be below 65535")
        })
    }
}

impl Default for TorrentConfig {
    fn default() -> Self {
        Self {
            listen_port: TORRENT_LISTEN_PORT,
            metadata_poll_interval: METADATA_POLL_INTERVAL,
            status_poll_interval: STATUS_POLL_INTERVAL,
        }
    }
}

/// Factory for engine sessions. One session is opened per task and torn
/// down when the task ends.
#[async_trait]
pub trait TorrentBackend: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Opens a session listening on `config.listen_port`, saving into `save_dir`.
    async fn open_session(
        &self,
        config: &TorrentConfig,
        save_dir: &Path,
    ) -> Result<Box<dyn TorrentSession>, DownloadError>;
}

/// A live engine session owned by a single task.
#[async_trait]
pub trait TorrentSession: Send + Sync {
    /// Adds a magnet or torrent link as a new managed torrent.
    async fn add(&self, uri: &str, save_dir: &Path) -> Result<TorrentId, DownloadError>;

    /// True once the torrent's metadata (file list, sizes) is known.
    async fn has_metadata(&self, id: TorrentId) -> Result<bool, DownloadError>;

    /// Total payload size from the torrent metadata.
    async fn total_size(&self, id: TorrentId) -> Result<u64, DownloadError>;

    async fn status(&self, id: TorrentId) -> Result<TorrentStatus, DownloadError>;

    /// Removes the torrent from the session, keeping downloaded files.
    async fn remove(&self, id: TorrentId) -> Result<(), DownloadError>;

    /// Stops the session and releases its sockets.
    async fn shutdown(&self);
}

/// Runs torrent tasks against an optional backend.
#[derive(Clone)]
pub struct TorrentWorker {
    backend: Option<Arc<dyn TorrentBackend>>,
    config: TorrentConfig,
}

impl fmt::Debug for TorrentWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TorrentWorker")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("config", &self.config)
            .finish()
    }
}

impl Default for TorrentWorker {
    fn default() -> Self {
        Self::with_default_backend()
    }
}

impl TorrentWorker {
    /// Creates a worker using the given engine.
    #[must_use]
    pub fn new(backend: Arc<dyn TorrentBackend>) -> Self {
        Self {
            backend: Some(backend),
            config: TorrentConfig::default(),
        }
    }

    /// Creates a worker with no engine; every task fails immediately.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            config: TorrentConfig::default(),
        }
    }

    /// Uses the engine compiled into this build, if any.
    #[must_use]
    pub fn with_default_backend() -> Self {
        #[cfg(feature = "torrent")]
        {
            Self::new(Arc::new(RqbitBackend))
        }
        #[cfg(not(feature = "torrent"))]
        {
            Self::unavailable()
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TorrentConfig) -> Self {
        self.config = config;
        self
    }

    /// Capability check: whether an engine is present.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Runs the task to completion and returns its outcome.
    ///
    /// The torrent is removed from the session on every exit path and the
    /// session is shut down before returning.
    #[instrument(skip_all, fields(uri = %task.source(), save_dir = %task.destination().display()))]
    pub async fn run(&self, task: &DownloadTask, cancel: &CancelToken, events: &EventSink) -> Outcome {
        let Some(backend) = self.backend.as_ref() else {
            let error = DownloadError::capability_unavailable(CAPABILITY);
            warn!(error = %error, "torrent download refused");
            return Outcome::failed(&error);
        };
        if cancel.is_cancelled() {
            return Outcome::Cancelled;
        }

        let session = match backend.open_session(&self.config, task.destination()).await {
            Ok(session) => session,
            Err(error) => {
                warn!(error = %error, "failed to open torrent session");
                return Outcome::failed(&error);
            }
        };
        debug!(backend = backend.name(), "torrent session opened");

        let mut added = None;
        let result = self
            .drive(session.as_ref(), &mut added, task, cancel, events)
            .await;

        if let Some(id) = added {
            match session.remove(id).await {
                Ok(()) => debug!(id, "torrent removed from session"),
                Err(error) => warn!(id, error = %error, "failed to remove torrent"),
            }
        }
        session.shutdown().await;

        match result {
            Ok(outcome) => {
                info!(success = outcome.is_success(), message = outcome.message(), "torrent task finished");
                outcome
            }
            Err(error) => {
                warn!(error = %error, "torrent download failed");
                Outcome::failed(&error)
            }
        }
    }

    async fn drive(
        &self,
        session: &dyn TorrentSession,
        added: &mut Option<TorrentId>,
        task: &DownloadTask,
        cancel: &CancelToken,
        events: &EventSink,
    ) -> Result<Outcome, DownloadError> {
        let uri = task.source();

        // A cancel here drops the pending add. The engine may still have
        // registered the torrent; shutting the session down releases it.
        let id = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(Outcome::Cancelled),
            id = session.add(uri, task.destination()) => id?,
        };
        *added = Some(id);
        debug!(id, "torrent added");

        loop {
            if cancel.is_cancelled() {
                debug!(id, "cancelled while waiting for metadata");
                return Ok(Outcome::Cancelled);
            }
            if session.has_metadata(id).await? {
                break;
            }
            pause(self.config.metadata_poll_interval, cancel).await;
        }

        let total = session.total_size(id).await?;
        debug!(id, total, "torrent metadata received");

        let mut bytes_done = 0;
        loop {
            if cancel.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            let status = session.status(id).await?;
            if let Some(message) = status.error {
                return Err(DownloadError::engine(uri, message));
            }
            if status.state.is_download_complete() {
                debug!(id, state = ?status.state, "download phase complete");
                break;
            }

            // Engines may re-check pieces; subscribers only ever see growth.
            bytes_done = status.bytes_done.max(bytes_done);
            events.progress(Progress::Torrent(TorrentProgress {
                percent: percent_from_ratio(status.progress),
                download_rate_bps: status.download_rate_bps,
                upload_rate_bps: status.upload_rate_bps,
                peers: status.peers,
                seeds: status.seeds,
                bytes_done,
                total_bytes: total,
            }));

            pause(self.config.status_poll_interval, cancel).await;
        }

        Ok(Outcome::succeeded("download complete"))
    }
}

/// Sleeps for `interval`, waking early if cancellation is requested.
async fn pause(interval: Duration, cancel: &CancelToken) {
    tokio::select! {
        () = tokio::time::sleep(interval) => {}
        () = cancel.cancelled() => {}
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent_from_ratio(ratio: f64) -> u8 {
    if ratio.is_nan() {
        return 0;
    }
    (ratio.clamp(0.0, 1.0) * 100.0).floor() as u8
}
