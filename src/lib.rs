//! Download list core library
//!
//! This library provides the core functionality behind the `dlist` tool,
//! which browses JSON "download lists" (title, URIs, size, rating, upload
//! date) and fetches their entries over HTTP or BitTorrent.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Download list documents: load, save, search, merge, fetch
//! - [`download`] - Background download workers (HTTP and torrent),
//!   progress events, cancellation and the single-download controller

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;

// Re-export commonly used types
pub use catalog::{CatalogError, DownloadEntry, DownloadList, Page};
pub use download::{
    CancelToken, ControllerError, DownloadController, DownloadError, DownloadEvent,
    DownloadHandle, DownloadTask, FailureKind, HttpClient, HttpWorker, Outcome, Progress,
    TaskKind, TorrentWorker,
};
