//! Human-readable sizes, speeds and ETAs for progress lines.

use std::time::Duration;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// `"12.34 MB"` (binary megabytes).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MIB)
}

/// `"512.0 KB/s"`.
#[must_use]
pub fn kilobytes_per_second(bytes_per_second: f64) -> String {
    let rate = if bytes_per_second.is_finite() {
        bytes_per_second.max(0.0)
    } else {
        0.0
    };
    format!("{:.1} KB/s", rate / KIB)
}

/// Remaining time at the current rate.
///
/// `None` when total or rate is unknown, or when nothing is left to fetch.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn eta(downloaded: u64, total: u64, bytes_per_second: f64) -> Option<Duration> {
    if total == 0 || downloaded >= total {
        return None;
    }
    if !bytes_per_second.is_finite() || bytes_per_second <= 0.0 {
        return None;
    }
    let remaining = (total - downloaded) as f64;
    Some(Duration::from_secs((remaining / bytes_per_second).ceil() as u64))
}

/// `HH:MM:SS`; hours are not wrapped at 24.
#[must_use]
pub fn clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
