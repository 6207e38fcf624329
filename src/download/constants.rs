//! Constants for the download module (timeouts, chunking, torrent polling).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Size of one unit of work for the HTTP worker (8 KiB).
///
/// Cancellation is checked, and a progress event emitted, once per chunk.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Interval between checks for torrent metadata.
pub const METADATA_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interval between torrent status polls once metadata is known.
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Fixed port the torrent session listens on.
pub const TORRENT_LISTEN_PORT: u16 = 6881;
