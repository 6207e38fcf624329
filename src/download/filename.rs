//! Save-name derivation and path resolution for file downloads.
//!
//! The name of a downloaded file is the last path segment of its URL (query
//! and fragment ignored, percent-decoded), made safe for common
//! filesystems. URLs without a usable segment are saved as `download`.

use std::path::{Component, Path, PathBuf};

use tracing::debug;
use url::Url;

/// Name used when a URL has no usable last segment.
pub const FALLBACK_FILENAME: &str = "download";

/// Derives the save name for a URL.
#[must_use]
pub fn filename_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        debug!(url, "unparseable URL, using fallback filename");
        return FALLBACK_FILENAME.to_string();
    };
    let Some(last) = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty())
    else {
        return FALLBACK_FILENAME.to_string();
    };

    let decoded = urlencoding::decode(last).map_or_else(
        |e| {
            debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
            last.to_string()
        },
        std::borrow::Cow::into_owned,
    );
    let sanitized = sanitize_filename(&decoded);
    if sanitized.trim_matches('_').is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Resolves a path in `dir` that does not exist yet.
///
/// Example: `file.zip`, then `file_1.zip`, `file_2.zip`, ...
#[must_use]
pub fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let base_path = dir.join(filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename, ""),
    };

    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filename_from_url_uses_last_segment_without_query() {
        assert_eq!(
            filename_from_url("https://example.com/files/game.zip?token=abc"),
            "game.zip"
        );
        assert_eq!(
            filename_from_url("https://example.com/files/game.zip#part"),
            "game.zip"
        );
    }

    #[test]
    fn test_filename_from_url_decodes_percent_escapes() {
        assert_eq!(
            filename_from_url("https://example.com/My%20Game%20v1.2.rar"),
            "My Game v1.2.rar"
        );
    }

    #[test]
    fn test_filename_from_url_falls_back_for_empty_segment() {
        assert_eq!(filename_from_url("https://example.com/"), "download");
        assert_eq!(filename_from_url("https://example.com"), "download");
        assert_eq!(filename_from_url("https://example.com/dir/?q=1"), "download");
    }

    #[test]
    fn test_filename_from_url_falls_back_for_unparseable_input() {
        assert_eq!(filename_from_url("not a url"), "download");
        assert_eq!(filename_from_url("files/game.zip"), "download");
        assert_eq!(filename_from_url("mailto:someone@example.com"), "download");
    }

    #[test]
    fn test_filename_from_url_neutralises_traversal() {
        assert_eq!(filename_from_url("https://example.com/a/%2E%2E"), "download");
        assert_eq!(
            filename_from_url("https://example.com/a/..%2Fetc%2Fpasswd"),
            ".._etc_passwd"
        );
    }

    #[test]
    fn test_sanitize_filename_removes_invalid_chars() {
        assert_eq!(sanitize_filename("file/name.zip"), "file_name.zip");
        assert_eq!(sanitize_filename("file:name.zip"), "file_name.zip");
        assert_eq!(sanitize_filename("file<name>.zip"), "file_name_.zip");
        assert_eq!(sanitize_filename("file|name.zip"), "file_name.zip");
    }

    #[test]
    fn test_sanitize_filename_preserves_valid_chars() {
        assert_eq!(sanitize_filename("file (1).zip"), "file (1).zip");
        assert_eq!(sanitize_filename("日本語.zip"), "日本語.zip");
    }

    #[test]
    fn test_resolve_unique_path_adds_numeric_suffix() {
        let temp = TempDir::new().unwrap();
        let first = resolve_unique_path(temp.path(), "game.zip");
        assert_eq!(first, temp.path().join("game.zip"));

        std::fs::write(&first, b"x").unwrap();
        let second = resolve_unique_path(temp.path(), "game.zip");
        assert_eq!(second, temp.path().join("game_1.zip"));
    }

    #[test]
    fn test_resolve_unique_path_without_extension() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("download"), b"x").unwrap();
        assert_eq!(
            resolve_unique_path(temp.path(), "download"),
            temp.path().join("download_1")
        );
    }
}
