//! Worker that streams a single HTTP(S) file to disk.

use std::path::Path;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use super::cancel::CancelToken;
use super::client::HttpClient;
use super::constants::CHUNK_SIZE;
use super::error::DownloadError;
use super::event::{EventSink, FileProgress, Outcome, Progress};
use super::task::DownloadTask;

/// How the body loop ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamEnd {
    Completed { bytes: u64 },
    Cancelled { bytes: u64 },
}

/// Streams a URL to its destination file, one chunk at a time.
///
/// No retries: any network or I/O error ends the task. Partial output is
/// left on disk after a failure or cancellation.
#[derive(Debug, Clone)]
pub struct HttpWorker {
    client: HttpClient,
    chunk_size: usize,
}

impl Default for HttpWorker {
    fn default() -> Self {
        Self::new(HttpClient::new())
    }
}

impl HttpWorker {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Overrides the chunk size (minimum 1 byte).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Runs the task to completion and returns its outcome.
    ///
    /// Emits one [`Progress::File`] per chunk written.
    #[instrument(skip_all, fields(url = %task.source(), path = %task.destination().display()))]
    pub async fn run(&self, task: &DownloadTask, cancel: &CancelToken, events: &EventSink) -> Outcome {
        match self.download(task, cancel, events).await {
            Ok(StreamEnd::Completed { bytes }) => {
                info!(bytes, "download complete");
                Outcome::succeeded("download complete")
            }
            Ok(StreamEnd::Cancelled { bytes }) => {
                info!(bytes, "download cancelled");
                Outcome::Cancelled
            }
            Err(error) => {
                warn!(error = %error, "download failed");
                Outcome::failed(&error)
            }
        }
    }

    async fn download(
        &self,
        task: &DownloadTask,
        cancel: &CancelToken,
        events: &EventSink,
    ) -> Result<StreamEnd, DownloadError> {
        let started = Instant::now();
        if cancel.is_cancelled() {
            return Ok(StreamEnd::Cancelled { bytes: 0 });
        }

        let url = task.source();
        let response = self.client.get(url).await?;
        let total = response.content_length().unwrap_or(0);
        debug!(total, "response accepted");

        if cancel.is_cancelled() {
            return Ok(StreamEnd::Cancelled { bytes: 0 });
        }

        let path = task.destination();
        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| DownloadError::network(url, e)));
        let streamed = stream_to_file(
            body,
            &mut file,
            path,
            total,
            started,
            self.chunk_size,
            cancel,
            events,
        )
        .await;

        // Flush on every path so the partial file reflects every chunk written.
        let flushed = file.flush().await.map_err(|e| DownloadError::io(path, e));
        let end = streamed?;
        flushed?;
        Ok(end)
    }
}

/// Writes a body stream to `file`, splitting it into `chunk_size` pieces.
///
/// Cancellation is checked before each piece; a piece is either written
/// whole or not at all.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn stream_to_file<S>(
    stream: S,
    file: &mut File,
    path: &Path,
    total: u64,
    started: Instant,
    chunk_size: usize,
    cancel: &CancelToken,
    events: &EventSink,
) -> Result<StreamEnd, DownloadError>
where
    S: Stream<Item = Result<Bytes, DownloadError>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut downloaded: u64 = 0;

    while let Some(next) = stream.next().await {
        let bytes = next?;
        for chunk in bytes.chunks(chunk_size.max(1)) {
            if cancel.is_cancelled() {
                return Ok(StreamEnd::Cancelled { bytes: downloaded });
            }
            file.write_all(chunk)
                .await
                .map_err(|e| DownloadError::io(path, e))?;
            downloaded += chunk.len() as u64;
            events.progress(Progress::File(file_progress(
                downloaded,
                total,
                started.elapsed(),
            )));
        }
    }

    Ok(StreamEnd::Completed { bytes: downloaded })
}

/// Builds a progress snapshot; throughput is the running average since start.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn file_progress(downloaded: u64, total: u64, elapsed: Duration) -> FileProgress {
    let secs = elapsed.as_secs_f64();
    let bytes_per_second = if secs > 0.0 {
        downloaded as f64 / secs
    } else {
        0.0
    };
    let percent = if total > 0 {
        let ratio = u128::from(downloaded.min(total)) * 100 / u128::from(total);
        u8::try_from(ratio).unwrap_or(100)
    } else {
        0
    };
    FileProgress {
        percent,
        bytes_downloaded: downloaded,
        total_bytes: total,
        bytes_per_second,
        elapsed,
    }
}
