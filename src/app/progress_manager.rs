//! Progress UI (bar) for a running download.

use dlist_core::download::format::{clock, eta, kilobytes_per_second, megabytes};
use dlist_core::{Outcome, Progress};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Renders [`Progress`] updates to an indicatif bar on stderr.
///
/// When disabled (quiet, piped or dumb terminal) updates only go to the
/// debug log.
pub(crate) struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub(crate) fn new(use_bar: bool, label: &str) -> Self {
        if !use_bar {
            return Self { bar: None };
        }
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{prefix} [{bar:30}] {pos:>3}% {msg}")
                .map(|style| style.progress_chars("=> "))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_prefix(label.to_string());
        Self { bar: Some(bar) }
    }

    pub(crate) fn update(&self, progress: &Progress) {
        let line = progress_line(progress);
        match &self.bar {
            Some(bar) => {
                bar.set_position(u64::from(progress.percent()));
                bar.set_message(line);
            }
            None => debug!(percent = progress.percent(), "{line}"),
        }
    }

    pub(crate) fn finish(&self, outcome: &Outcome) {
        if let Some(bar) = &self.bar {
            if outcome.is_success() {
                bar.finish_with_message(outcome.message().to_string());
            } else {
                bar.abandon_with_message(outcome.message().to_string());
            }
        }
    }
}

/// One-line description of a progress update.
pub(crate) fn progress_line(progress: &Progress) -> String {
    match progress {
        Progress::File(file) => {
            let mut line = if file.total_bytes > 0 {
                format!(
                    "{} / {} @ {}",
                    megabytes(file.bytes_downloaded),
                    megabytes(file.total_bytes),
                    kilobytes_per_second(file.bytes_per_second)
                )
            } else {
                format!(
                    "{} @ {}",
                    megabytes(file.bytes_downloaded),
                    kilobytes_per_second(file.bytes_per_second)
                )
            };
            if let Some(remaining) =
                eta(file.bytes_downloaded, file.total_bytes, file.bytes_per_second)
            {
                line.push_str(&format!(" ETA {}", clock(remaining)));
            }
            line
        }
        Progress::Torrent(torrent) => {
            #[allow(clippy::cast_precision_loss)]
            let down = torrent.download_rate_bps as f64;
            #[allow(clippy::cast_precision_loss)]
            let up = torrent.upload_rate_bps as f64;
            let mut line = format!(
                "{} / {} down {} up {} peers {} seeds {}",
                megabytes(torrent.bytes_done),
                megabytes(torrent.total_bytes),
                kilobytes_per_second(down),
                kilobytes_per_second(up),
                torrent.peers,
                torrent.seeds
            );
            if let Some(remaining) = eta(torrent.bytes_done, torrent.total_bytes, down) {
                line.push_str(&format!(" ETA {}", clock(remaining)));
            }
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dlist_core::download::{FileProgress, TorrentProgress};

    use super::*;

    #[test]
    fn test_file_progress_line_with_known_total() {
        let line = progress_line(&Progress::File(FileProgress {
            percent: 50,
            bytes_downloaded: 1024 * 1024,
            total_bytes: 2 * 1024 * 1024,
            bytes_per_second: 1024.0 * 1024.0,
            elapsed: Duration::from_secs(1),
        }));
        assert_eq!(line, "1.00 MB / 2.00 MB @ 1024.0 KB/s ETA 00:00:01");
    }

    #[test]
    fn test_file_progress_line_with_unknown_total_has_no_eta() {
        let line = progress_line(&Progress::File(FileProgress {
            percent: 0,
            bytes_downloaded: 512 * 1024,
            total_bytes: 0,
            bytes_per_second: 2048.0,
            elapsed: Duration::from_secs(3),
        }));
        assert_eq!(line, "0.50 MB @ 2.0 KB/s");
    }

    #[test]
    fn test_completed_file_progress_line_has_no_eta() {
        let line = progress_line(&Progress::File(FileProgress {
            percent: 100,
            bytes_downloaded: 1024 * 1024,
            total_bytes: 1024 * 1024,
            bytes_per_second: 1024.0,
            elapsed: Duration::from_secs(1),
        }));
        assert_eq!(line, "1.00 MB / 1.00 MB @ 1.0 KB/s");
    }

    #[test]
    fn test_torrent_progress_line_shows_swarm() {
        let line = progress_line(&Progress::Torrent(TorrentProgress {
            percent: 10,
            download_rate_bps: 0,
            upload_rate_bps: 1024,
            peers: 7,
            seeds: 2,
            bytes_done: 0,
            total_bytes: 1024 * 1024,
        }));
        assert_eq!(
            line,
            "0.00 MB / 1.00 MB down 0.0 KB/s up 1.0 KB/s peers 7 seeds 2"
        );
    }

    #[test]
    fn test_disabled_reporter_accepts_updates() {
        let reporter = ProgressReporter::new(false, "file.zip");
        reporter.update(&Progress::File(FileProgress {
            percent: 100,
            bytes_downloaded: 1,
            total_bytes: 1,
            bytes_per_second: 1.0,
            elapsed: Duration::from_secs(1),
        }));
        reporter.finish(&Outcome::Cancelled);
        assert!(reporter.bar.is_none());
    }
}
