//! Download lists: named JSON catalogs of downloadable entries.
//!
//! A list is a document of the form
//! `{"name": ..., "downloads": [{"title", "uris", "fileSize", "uploadDate", ...}]}`.
//! Keys this crate does not know about are preserved on round-trip.
//!
//! # Example
//!
//! ```
//! use dlist_core::DownloadList;
//!
//! let list = DownloadList::from_json_str(
//!     r#"{"name": "demo", "downloads": [{"title": "Alpha", "uris": []}]}"#,
//!     "inline",
//! )?;
//! assert_eq!(list.search("alp").len(), 1);
//! # Ok::<(), dlist_core::CatalogError>(())
//! ```

mod entry;
mod error;
mod remote;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub use entry::{DownloadEntry, UNTITLED};
pub use error::CatalogError;
pub use remote::{CACHE_MAX_AGE, FetchedList, ListCache};

/// Entries shown per page when listing.
pub const DEFAULT_PAGE_SIZE: usize = 400;

/// A named download list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub downloads: Vec<DownloadEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a list, with original entry indices.
#[derive(Debug)]
pub struct Page<'a> {
    /// 1-based page number, clamped to `1..=total_pages`.
    pub number: usize,
    pub total_pages: usize,
    pub entries: Vec<(usize, &'a DownloadEntry)>,
}

impl DownloadList {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Parses a list from JSON text. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the text is not a download list.
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::parse(origin, e))
    }

    /// Parses a list from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the bytes are not a download list.
    pub fn from_json_slice(json: &[u8], origin: &str) -> Result<Self, CatalogError> {
        serde_json::from_slice(json).map_err(|e| CatalogError::parse(origin, e))
    }

    /// Loads a list from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path).map_err(|e| CatalogError::read(path, e))?;
        let list = Self::from_json_slice(&bytes, &path.display().to_string())?;
        debug!(path = %path.display(), entries = list.downloads.len(), "loaded download list");
        Ok(list)
    }

    /// Pretty JSON with four-space indentation. Non-ASCII text is written as-is.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Serialize`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, CatalogError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .map_err(CatalogError::Serialize)?;
        // serde_json only emits valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes the list to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let json = self.to_json_string()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CatalogError::write(parent, e))?;
        }
        std::fs::write(path, json).map_err(|e| CatalogError::write(path, e))?;
        info!(path = %path.display(), entries = self.downloads.len(), "saved download list");
        Ok(())
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNTITLED)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.downloads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty()
    }

    /// Entries whose title contains `term`, case-insensitively.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<(usize, &DownloadEntry)> {
        self.downloads
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.matches(term))
            .collect()
    }

    /// Number of pages at `per_page` entries each; at least one.
    #[must_use]
    pub fn total_pages(&self, per_page: usize) -> usize {
        let per_page = per_page.max(1);
        self.downloads.len().div_ceil(per_page).max(1)
    }

    /// Returns page `number` (1-based). Out-of-range numbers are clamped.
    #[must_use]
    pub fn page(&self, number: usize, per_page: usize) -> Page<'_> {
        let per_page = per_page.max(1);
        let total_pages = self.total_pages(per_page);
        let number = number.clamp(1, total_pages);
        let entries = self
            .downloads
            .iter()
            .enumerate()
            .skip((number - 1) * per_page)
            .take(per_page)
            .collect();
        Page {
            number,
            total_pages,
            entries,
        }
    }

    /// Looks up an entry by 0-based index, or by exact (case-insensitive) title.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::EntryNotFound`] if nothing matches.
    pub fn find(&self, query: &str) -> Result<&DownloadEntry, CatalogError> {
        let by_index = query
            .parse::<usize>()
            .ok()
            .and_then(|index| self.downloads.get(index));
        by_index
            .or_else(|| {
                self.downloads
                    .iter()
                    .find(|entry| entry.display_title().eq_ignore_ascii_case(query))
            })
            .ok_or_else(|| CatalogError::EntryNotFound {
                query: query.to_string(),
            })
    }

    /// A copy of this list with every `rating` removed.
    #[must_use]
    pub fn without_ratings(&self) -> Self {
        let mut exported = self.clone();
        for entry in &mut exported.downloads {
            entry.rating = None;
            entry.extra.remove("rating");
        }
        exported
    }

    /// Merges lists into one.
    ///
    /// The first list provides the name and top-level keys. Entries are
    /// deduplicated by title, first occurrence wins; entries without a
    /// title are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotEnoughLists`] for fewer than two inputs.
    pub fn merge(lists: &[Self]) -> Result<Self, CatalogError> {
        let [first, ..] = lists else {
            return Err(CatalogError::NotEnoughLists { count: 0 });
        };
        if lists.len() < 2 {
            return Err(CatalogError::NotEnoughLists { count: lists.len() });
        }

        let mut seen = HashSet::new();
        let downloads: Vec<DownloadEntry> = lists
            .iter()
            .flat_map(|list| list.downloads.iter())
            .filter(|entry| {
                entry
                    .title
                    .as_ref()
                    .is_some_and(|title| seen.insert(title.clone()))
            })
            .cloned()
            .collect();

        let total: usize = lists.iter().map(Self::len).sum();
        info!(
            lists = lists.len(),
            entries_in = total,
            entries_out = downloads.len(),
            "merged download lists"
        );

        Ok(Self {
            name: first.name.clone(),
            downloads,
            extra: first.extra.clone(),
        })
    }
}
