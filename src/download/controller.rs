//! Single-download controller.
//!
//! Owns one worker of each kind and runs at most one task at a time on a
//! background tokio task. A second `start` while a task is in flight is
//! refused with [`ControllerError::Busy`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::cancel::CancelToken;
use super::error::DownloadError;
use super::event::{DownloadEvent, EventSink, Outcome};
use super::http_worker::HttpWorker;
use super::task::{DownloadTask, TaskKind};
use super::torrent::TorrentWorker;

/// Errors returned when a task cannot be started.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// Another download is still running.
    #[error("a download is already in progress")]
    Busy,
}

/// Starts download tasks, one at a time.
#[derive(Debug, Clone)]
pub struct DownloadController {
    http: HttpWorker,
    torrent: TorrentWorker,
    active: Arc<AtomicBool>,
}

impl Default for DownloadController {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadController {
    /// Creates a controller with default workers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_workers(HttpWorker::default(), TorrentWorker::with_default_backend())
    }

    #[must_use]
    pub fn with_workers(http: HttpWorker, torrent: TorrentWorker) -> Self {
        Self {
            http,
            torrent,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a task started by this controller (or a clone) is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Whether torrent tasks can run in this build.
    #[must_use]
    pub fn torrent_available(&self) -> bool {
        self.torrent.is_available()
    }

    /// Starts `task` on a background tokio task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`] if another task is in flight.
    pub fn start(&self, task: DownloadTask) -> Result<DownloadHandle, ControllerError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(source = task.source(), "refusing to start a second download");
            return Err(ControllerError::Busy);
        }
        let guard = ActiveGuard(Arc::clone(&self.active));

        let (tx, rx) = unbounded_channel();
        let events = EventSink::new(tx);
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let http = self.http.clone();
        let torrent = self.torrent.clone();

        debug!(source = task.source(), kind = ?task.kind(), "starting download");
        let join = tokio::spawn(async move {
            let _guard = guard;
            let outcome = match task.kind() {
                TaskKind::File => http.run(&task, &worker_cancel, &events).await,
                TaskKind::Torrent => torrent.run(&task, &worker_cancel, &events).await,
            };
            events.finish(outcome.clone());
            outcome
        });

        Ok(DownloadHandle {
            events: rx,
            cancel,
            join,
        })
    }
}

/// Clears the active flag when the worker task ends, even on panic.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Caller side of a running task.
#[derive(Debug)]
pub struct DownloadHandle {
    events: UnboundedReceiver<DownloadEvent>,
    cancel: CancelToken,
    join: JoinHandle<Outcome>,
}

impl DownloadHandle {
    /// Requests cooperative cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the task's stop signal, e.g. for a Ctrl-C handler.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next notification; `None` after the final [`DownloadEvent::Finished`].
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        self.events.recv().await
    }

    /// Waits for the task to end and returns its outcome.
    ///
    /// Remaining events are discarded, and the receiver is closed before
    /// waiting so the worker's later events are dropped instead of buffered.
    pub async fn wait(self) -> Outcome {
        let Self { events, join, .. } = self;
        drop(events);
        match join.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                warn!(error = %join_error, "download task aborted");
                Outcome::failed(&DownloadError::engine("worker", join_error))
            }
        }
    }
}
