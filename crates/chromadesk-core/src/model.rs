//! Featured image metadata as returned by a metadata source.

use chrono::NaiveDate;

pub const UNKNOWN_TITLE: &str = "Unknown Title";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedImageInfo {
    /// Day the source labels the image with; may differ from the local date.
    pub date: NaiveDate,
    pub title: Option<String>,
    pub copyright: Option<String>,
    /// Absolute URL of the full-resolution asset.
    pub full_url: String,
}

impl FeaturedImageInfo {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_TITLE)
    }
}
