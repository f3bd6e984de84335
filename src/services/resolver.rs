use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CatalogCandidate, MediaKind};

/// On-disk title convention: `Name (YYYY) [TYPE]`, both groups optional.
/// The name capture is non-greedy so the year/type annotations are taken
/// by their own groups whenever they are present.
static TITLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.*?)(?:\s+\((\d{4})\))?(?:\s+\[(FILME|SÉRIE|TV)\])?$")
        .expect("title pattern")
});

/// A display title decomposed into its catalog search ingredients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    pub name: String,
    pub year: Option<String>,
    pub kind: Option<MediaKind>,
}

/// Splits a list title into name, optional year and optional kind.
/// Falls back to the whole string as the name when the pattern does not
/// apply.
pub fn decompose(display_title: &str) -> TitleParts {
    let Some(captures) = TITLE_PATTERN.captures(display_title) else {
        return TitleParts {
            name: display_title.trim().to_string(),
            year: None,
            kind: None,
        };
    };

    let name = captures
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let year = captures.get(2).map(|m| m.as_str().to_string());
    let kind = captures
        .get(3)
        .and_then(|m| match m.as_str().to_uppercase().as_str() {
            "FILME" => Some(MediaKind::Movie),
            "SÉRIE" | "TV" => Some(MediaKind::Tv),
            _ => None,
        });

    TitleParts { name, year, kind }
}

/// Chooses one catalog candidate for the decomposed title.
///
/// Candidates are scoped to the requested kind when one was given,
/// falling back to the full set when that filter empties it. With a year,
/// the first candidate whose release date starts with it wins; otherwise
/// (or when no year matches) the first candidate of the scoped set wins.
/// Catalog relevance order is authoritative throughout.
pub fn resolve<'a>(
    parts: &TitleParts,
    candidates: &'a [CatalogCandidate],
) -> Option<&'a CatalogCandidate> {
    if candidates.is_empty() {
        return None;
    }

    let scoped: Vec<&CatalogCandidate> = match parts.kind {
        Some(kind) => {
            let filtered: Vec<&CatalogCandidate> =
                candidates.iter().filter(|c| c.kind == kind).collect();
            if filtered.is_empty() {
                candidates.iter().collect()
            } else {
                filtered
            }
        }
        None => candidates.iter().collect(),
    };

    if let Some(year) = &parts.year {
        if let Some(hit) = scoped
            .iter()
            .find(|c| c.release_date.as_deref().is_some_and(|d| d.starts_with(year)))
        {
            return Some(hit);
        }
    }

    scoped.first().copied()
}
