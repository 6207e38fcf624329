//! A single entry of a download list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Title shown for entries that have none.
pub const UNTITLED: &str = "Untitled";

/// One downloadable item. Unknown keys are kept and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub uris: Vec<String>,

    /// Human readable size as published by the list author (e.g. "1.2 GB").
    #[serde(rename = "fileSize", default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,

    #[serde(rename = "uploadDate", default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,

    /// Star rating, 1..=5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    #[serde(
        rename = "repackLinkSource",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub repack_link_source: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DownloadEntry {
    /// Title for display, [`UNTITLED`] when missing.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Case-insensitive substring match on the display title.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        self.display_title()
            .to_lowercase()
            .contains(&term.to_lowercase())
    }

    /// `★★★☆☆` style rendering; empty when unrated.
    #[must_use]
    pub fn stars(&self) -> String {
        match self.rating {
            Some(rating) if rating > 0 => {
                let filled = usize::from(rating.min(5));
                format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
            }
            _ => String::new(),
        }
    }
}
