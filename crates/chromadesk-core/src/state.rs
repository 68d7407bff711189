//! Persisted update state (enabled flag, region, last successful update date, retention).

use chrono::NaiveDate;

pub const DEFAULT_REGION: &str = "en-US";
pub const DEFAULT_KEEP_HISTORY: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateState {
    pub enabled: bool,
    pub region: String,
    /// Local calendar day of the last run whose apply step succeeded.
    pub last_update_date: Option<NaiveDate>,
    /// Images kept after pruning. Values <= 0 keep everything.
    pub keep_history: i64,
}

impl Default for UpdateState {
    fn default() -> Self {
        Self {
            enabled: false,
            region: DEFAULT_REGION.to_string(),
            last_update_date: None,
            keep_history: DEFAULT_KEEP_HISTORY,
        }
    }
}

/// Parse a stored `YYYY-MM-DD` value. Empty or malformed input means "never updated".
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
