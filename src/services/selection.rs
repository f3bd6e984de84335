use rand::{rngs::OsRng, Rng};
use std::sync::Arc;

use crate::{
    models::{
        CatalogCandidate, Entry, MediaDetails, ProviderRegion, RatingKind, Selection,
    },
    services::catalog::CatalogProvider,
    services::resolver,
};

/// Uniform random index source, injectable so selection is scriptable in
/// tests
pub trait IndexPicker: Send + Sync {
    /// Uniform index in `[0, len)`; `len` is nonzero
    fn pick_index(&self, len: usize) -> usize;
}

/// Draws from the operating system entropy source. `gen_range` rejection
/// samples, so every index carries probability 1/len.
pub struct OsEntropyPicker;

impl IndexPicker for OsEntropyPicker {
    fn pick_index(&self, len: usize) -> usize {
        OsRng.gen_range(0..len)
    }
}

/// What a switch produces: the line to commit plus the catalog data the
/// live selection takes over on success
pub struct SwitchOutcome {
    pub line: String,
    pub media: MediaDetails,
    pub providers: Option<ProviderRegion>,
}

/// Builds selections: random pick over unwatched entries, catalog
/// enrichment, and the committed-line computations for switch/rate.
///
/// Catalog failures never escape this type; they degrade to missing data
/// and only the reconciler's storage writes surface errors.
pub struct SelectionEngine {
    catalog: Arc<dyn CatalogProvider>,
    picker: Arc<dyn IndexPicker>,
}

impl SelectionEngine {
    pub fn new(catalog: Arc<dyn CatalogProvider>, picker: Arc<dyn IndexPicker>) -> Self {
        Self { catalog, picker }
    }

    /// Picks one unwatched entry uniformly at random and enriches it.
    /// `None` when every entry is watched: there is nothing to select.
    pub async fn pick(&self, entries: &[Entry]) -> Option<Selection> {
        let unwatched: Vec<&Entry> = entries.iter().filter(|e| !e.watched).collect();
        if unwatched.is_empty() {
            return None;
        }

        let index = self.picker.pick_index(unwatched.len());
        let entry = unwatched[index];

        tracing::info!(
            candidates = unwatched.len(),
            title = %entry.title,
            "Entry picked"
        );

        Some(self.build_selection(entry).await)
    }

    async fn build_selection(&self, entry: &Entry) -> Selection {
        let parts = resolver::decompose(&entry.title);

        let alternatives = match self.catalog.search_multi(&parts.name).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(error = %e, query = %parts.name, "Catalog search failed");
                Vec::new()
            }
        };

        let resolved = resolver::resolve(&parts, &alternatives).cloned();

        let media = match &resolved {
            Some(candidate) => Some(self.details_or_bare(candidate).await),
            None => None,
        };

        let providers = match &resolved {
            Some(candidate) => self.providers_for(candidate.id, candidate.kind).await,
            None => None,
        };

        Selection {
            entry_line: entry.cleaned_line.clone(),
            title: entry.title.clone(),
            media,
            alternatives,
            providers,
        }
    }

    /// Re-fetches catalog data for an explicitly chosen candidate and
    /// computes the replacement line from the candidate's own record
    pub async fn switch_to(&self, candidate: &CatalogCandidate) -> SwitchOutcome {
        let media = self.details_or_bare(candidate).await;
        let providers = self.providers_for(candidate.id, candidate.kind).await;

        SwitchOutcome {
            line: format_media_line(candidate),
            media,
            providers,
        }
    }

    async fn details_or_bare(&self, candidate: &CatalogCandidate) -> MediaDetails {
        match self.catalog.details(candidate.id, candidate.kind).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    id = candidate.id,
                    "Detail fetch failed, keeping bare search hit"
                );
                MediaDetails::from(candidate.clone())
            }
        }
    }

    async fn providers_for(
        &self,
        id: u64,
        kind: crate::models::MediaKind,
    ) -> Option<ProviderRegion> {
        match self.catalog.watch_providers(id, kind).await {
            Ok(region) => region,
            Err(e) => {
                tracing::warn!(error = %e, id = id, "Provider fetch failed");
                None
            }
        }
    }
}

/// The list line written for a catalog record: `Title (Year) [TYPE]`,
/// year omitted when the catalog has no date
pub fn format_media_line(candidate: &CatalogCandidate) -> String {
    let mut line = candidate.title.clone();
    if let Some(year) = candidate.release_year() {
        line.push_str(&format!(" ({})", year));
    }
    line.push_str(&format!(" [{}]", candidate.kind.as_list_tag()));
    line
}

/// The committed line for a rating: the entry's title plus the fixed tag
pub fn rated_line(entry: &Entry, rating: RatingKind) -> String {
    format!("{} {}", entry.title, rating.tag())
}
