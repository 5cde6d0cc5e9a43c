use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a missing item name.
pub const UNKNOWN: &str = "Unknown";

/// Placeholder for absent values (duration, test type).
pub const NOT_AVAILABLE: &str = "N/A";

// ── Catalog record ────────────────────────────────────────────────────────────

/// One catalog row. Field order is the CSV column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub url: String,
    pub duration: String,       // never exposed in the listing view
    pub test_type: String,
    pub remote_testing: Flag,
    pub adaptive_irt: Flag,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Flag {
    Yes,
    No,
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        if b { Flag::Yes } else { Flag::No }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flag::Yes => "Yes",
            Flag::No => "No",
        })
    }
}

// ── Raw scraped row ───────────────────────────────────────────────────────────

/// Cells as found in the HTML, before sentinel defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCatalogRow {
    pub name: Option<String>,
    pub href: Option<String>,
    pub remote_marker: bool,
    pub adaptive_marker: bool,
    pub keys: Vec<String>,
}

// ── Catalog section ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    /// Short CLI handle, e.g. "prepackaged".
    pub key: String,
    /// Table heading text, e.g. "Pre-packaged Job Solutions".
    pub label: String,
    /// Value of the `type=` query parameter.
    pub type_param: u32,
    pub max_pages: u32,
}

impl Section {
    pub fn new(key: &str, label: &str, type_param: u32, max_pages: u32) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            type_param,
            max_pages,
        }
    }
}

// ── Scrape outcome ────────────────────────────────────────────────────────────

/// Why a section's pagination loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    FetchFailed(String),
    TableNotFound,
    EmptyPage,
    NoNextLink,
    /// "Next" pointed at a page already fetched in this section.
    LinkCycle,
    PageLimit,
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::FetchFailed(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            StopReason::TableNotFound => f.write_str("table not found"),
            StopReason::EmptyPage => f.write_str("page had no records"),
            StopReason::NoNextLink => f.write_str("no more pages"),
            StopReason::LinkCycle => f.write_str("next link already visited"),
            StopReason::PageLimit => f.write_str("page limit reached"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionReport {
    pub key: String,
    pub label: String,
    pub records: Vec<Record>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_from_bool() {
        assert_eq!(Flag::from(true), Flag::Yes);
        assert_eq!(Flag::from(false), Flag::No);
        assert_eq!(Flag::Yes.to_string(), "Yes");
    }

    #[test]
    fn test_only_fetch_failure_is_failure() {
        assert!(StopReason::FetchFailed("HTTP 500".into()).is_failure());
        assert!(!StopReason::EmptyPage.is_failure());
        assert!(!StopReason::NoNextLink.is_failure());
    }
}
