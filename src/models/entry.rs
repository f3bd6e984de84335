use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Bracketed tag marking a line as watched. The keyword is case-sensitive;
/// the tag body may carry a qualifier suffix, e.g. `[ASSISTIDO: BOM]`.
static WATCHED_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(WATCHED|ASSISTIDO).*\]").expect("watched tag pattern"));

/// One watch-list line with its derived fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Raw source text, byte-for-byte as read from the document
    pub original_line: String,
    /// Trimmed text: the canonical on-disk form and the search key for
    /// exact-text replacement. Must remain a verbatim substring of the
    /// remote document for writes keyed on it to land.
    pub cleaned_line: String,
    /// Cleaned line with the watched tag (if any) removed
    pub title: String,
    /// True iff the cleaned line carries a watched tag
    pub watched: bool,
}

impl Entry {
    fn from_line(line: &str) -> Option<Self> {
        let text = line.trim();
        if text.is_empty() {
            return None;
        }

        let watched = WATCHED_TAG.is_match(text);
        let title = WATCHED_TAG.replace(text, "").trim().to_string();

        Some(Self {
            original_line: line.to_string(),
            cleaned_line: text.to_string(),
            title,
            watched,
        })
    }

    /// Records a confirmed rating write: the line now carries a watched tag.
    /// The title keeps its pre-rating value so the selection display is stable.
    pub fn apply_rating(&mut self, committed_line: &str) {
        self.watched = true;
        self.cleaned_line = committed_line.to_string();
    }

    /// Records a confirmed switch write: both the title and the replacement
    /// key now reflect the catalog candidate's own line.
    pub fn apply_switch(&mut self, committed_line: &str) {
        self.title = committed_line.to_string();
        self.cleaned_line = committed_line.to_string();
    }
}

/// Parses document text into entries.
///
/// Splits on CRLF or LF, trims each line and drops lines that are empty
/// after trimming. The order of the remaining lines is preserved: entry
/// index order is document order, which is what matches an entry back
/// into the document.
pub fn parse_list(text: &str) -> Vec<Entry> {
    text.lines().filter_map(Entry::from_line).collect()
}

/// Serializes one entry back to its document line.
pub fn format_entry(entry: &Entry) -> &str {
    &entry.cleaned_line
}
