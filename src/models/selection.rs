use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::media::{CatalogCandidate, MediaDetails, ProviderRegion};

/// Trailing type annotation stripped for presentation only
static TYPE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+\[(FILME|SÉRIE|TV)\]\s*$").expect("type suffix pattern"));

/// The currently proposed item: one live at a time, cleared on a
/// successful rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    /// The bound entry's current `cleaned_line`: how the entry is located
    /// again when the selection is rated or switched
    pub entry_line: String,
    /// The bound entry's title as read from the list
    pub title: String,
    /// Resolved catalog candidate enriched by the detail fetch, or the
    /// bare search hit when the detail fetch failed; `None` when the
    /// catalog had nothing
    pub media: Option<MediaDetails>,
    /// Catalog search results, relevance order, at most ten
    pub alternatives: Vec<CatalogCandidate>,
    /// Region-scoped watch providers, best effort
    pub providers: Option<ProviderRegion>,
}

impl Selection {
    /// Title with a trailing `[FILME]`/`[SÉRIE]`/`[TV]` annotation removed
    pub fn display_title(&self) -> String {
        TYPE_SUFFIX.replace(&self.title, "").to_string()
    }
}
