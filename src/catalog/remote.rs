//! Download lists fetched over HTTP, cached on disk.
//!
//! A fetched list is stored as `<sha256(url)>_<unix seconds>.json` in the
//! cache directory. A copy younger than the cache's max age is returned
//! instead of hitting the network again.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use super::{CatalogError, DownloadList};
use crate::download::{DownloadError, HttpClient};

/// How long a fetched list is reused before fetching again.
pub const CACHE_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// A list obtained through [`ListCache::fetch`].
#[derive(Debug)]
pub struct FetchedList {
    pub list: DownloadList,
    /// The cache file backing `list`.
    pub path: PathBuf,
    /// True when no request was made.
    pub from_cache: bool,
}

/// On-disk cache of lists fetched by URL.
#[derive(Debug, Clone)]
pub struct ListCache {
    dir: PathBuf,
    max_age: Duration,
}

impl ListCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_age: CACHE_MAX_AGE,
        }
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 of the URL; prefix of every cache file for it.
    #[must_use]
    pub fn key_for(url: &str) -> String {
        Sha256::digest(url.as_bytes())
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    /// Newest cache file for `url` that is younger than the max age.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] if the cache directory exists but
    /// cannot be listed.
    pub async fn find_fresh(&self, url: &str) -> Result<Option<PathBuf>, CatalogError> {
        let prefix = format!("{}_", Self::key_for(url));
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CatalogError::read(&self.dir, e)),
        };

        let now = unix_now();
        let mut newest: Option<(u64, PathBuf)> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CatalogError::read(&self.dir, e))?
        {
            let name = entry.file_name();
            let Some(stamp) = name
                .to_str()
                .and_then(|name| name.strip_prefix(&prefix))
                .and_then(|rest| rest.strip_suffix(".json"))
                .and_then(|stamp| stamp.parse::<u64>().ok())
            else {
                continue;
            };
            if now.saturating_sub(stamp) >= self.max_age.as_secs() {
                continue;
            }
            if newest.as_ref().is_none_or(|(best, _)| stamp > *best) {
                newest = Some((stamp, entry.path()));
            }
        }
        Ok(newest.map(|(_, path)| path))
    }

    /// Returns the list at `url`, from cache when a fresh copy exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body is not a download
    /// list, or the cache cannot be written.
    #[instrument(skip(self, client), fields(cache = %self.dir.display()))]
    pub async fn fetch(&self, client: &HttpClient, url: &str) -> Result<FetchedList, CatalogError> {
        if let Some(path) = self.find_fresh(url).await? {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| CatalogError::read(&path, e))?;
            let list = DownloadList::from_json_slice(&bytes, &path.display().to_string())?;
            debug!(path = %path.display(), "using cached list");
            return Ok(FetchedList {
                list,
                path,
                from_cache: true,
            });
        }

        let response = client.get(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        let list = DownloadList::from_json_slice(&body, url)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CatalogError::write(&self.dir, e))?;
        let path = self
            .dir
            .join(format!("{}_{}.json", Self::key_for(url), unix_now()));
        let json = list.to_json_string()?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| CatalogError::write(&path, e))?;
        info!(path = %path.display(), entries = list.len(), "fetched list");

        Ok(FetchedList {
            list,
            path,
            from_cache: false,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_key_is_stable_hex_sha256() {
        let key = ListCache::key_for("https://example.com/list.json");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, ListCache::key_for("https://example.com/list.json"));
        assert_ne!(key, ListCache::key_for("https://example.com/other.json"));
    }

    #[tokio::test]
    async fn test_find_fresh_without_cache_dir_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = ListCache::new(dir.path().join("missing"));
        assert!(cache.find_fresh("https://x/y").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_fresh_picks_newest_and_ignores_stale() {
        let dir = TempDir::new().unwrap();
        let url = "https://example.com/list.json";
        let key = ListCache::key_for(url);
        let now = unix_now();

        let stale = dir.path().join(format!("{key}_{}.json", now - 7_200));
        let older = dir.path().join(format!("{key}_{}.json", now - 600));
        let newer = dir.path().join(format!("{key}_{}.json", now - 60));
        let other = dir.path().join(format!("{}_{now}.json", ListCache::key_for("other")));
        for path in [&stale, &older, &newer, &other] {
            std::fs::write(path, "{}").unwrap();
        }

        let cache = ListCache::new(dir.path());
        assert_eq!(cache.find_fresh(url).await.unwrap(), Some(newer));

        let strict = ListCache::new(dir.path()).with_max_age(Duration::from_secs(30));
        assert!(strict.find_fresh(url).await.unwrap().is_none());
    }
}
