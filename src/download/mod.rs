//! Background download workers for single files and torrents.
//!
//! A download is described by a [`DownloadTask`] and executed by one of two
//! workers on a tokio task:
//!
//! - [`HttpWorker`] streams a URL to a file in 8 KiB chunks, reporting bytes,
//!   percent and average throughput after every chunk.
//! - [`TorrentWorker`] drives a torrent engine session, polling its status
//!   until the download phase is over and reporting swarm statistics.
//!
//! Both workers observe a shared [`CancelToken`] at every chunk or poll
//! boundary and finish with exactly one [`Outcome`]. The
//! [`DownloadController`] enforces that only one download runs at a time and
//! forwards [`DownloadEvent`]s to the caller.
//!
//! # Example
//!
//! ```no_run
//! use dlist_core::download::{DownloadController, DownloadEvent, DownloadTask};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = DownloadController::new();
//! let task = DownloadTask::new("https://example.com/file.zip", "./file.zip");
//! let mut handle = controller.start(task)?;
//! while let Some(event) = handle.next_event().await {
//!     match event {
//!         DownloadEvent::Progress(progress) => println!("{}%", progress.percent()),
//!         DownloadEvent::Finished(outcome) => println!("{}", outcome.message()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod cancel;
mod client;
mod constants;
mod controller;
mod error;
mod event;
pub mod filename;
pub mod format;
mod http_worker;
mod task;
pub mod torrent;

pub use cancel::CancelToken;
pub use client::HttpClient;
pub use constants::{
    CHUNK_SIZE, CONNECT_TIMEOUT_SECS, METADATA_POLL_INTERVAL, READ_TIMEOUT_SECS,
    STATUS_POLL_INTERVAL, TORRENT_LISTEN_PORT,
};
pub use controller::{ControllerError, DownloadController, DownloadHandle};
pub use error::DownloadError;
pub use event::{
    DownloadEvent, EventSink, FailureKind, FileProgress, Outcome, Progress, TorrentProgress,
};
pub use http_worker::HttpWorker;
pub use task::{DownloadTask, TaskKind};
pub use torrent::{TorrentConfig, TorrentWorker};

// Note: as in the rest of the crate, no module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
