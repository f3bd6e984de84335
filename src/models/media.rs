use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Media kind as the catalog distinguishes it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the catalog API (`/movie/{id}`, `/tv/{id}`)
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Bracketed type token written to the list
    pub fn as_list_tag(&self) -> &'static str {
        match self {
            MediaKind::Movie => "FILME",
            MediaKind::Tv => "SÉRIE",
        }
    }
}

/// How the user rated the selected entry; each maps to a fixed watched tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RatingKind {
    Positive,
    Negative,
    Heart,
    Other,
}

impl RatingKind {
    pub fn tag(&self) -> &'static str {
        match self {
            RatingKind::Positive => "[ASSISTIDO: BOM]",
            RatingKind::Negative => "[ASSISTIDO: RUIM]",
            RatingKind::Heart => "[ASSISTIDO: AMEI]",
            RatingKind::Other => "[ASSISTIDO]",
        }
    }
}

/// One catalog search hit (movie or TV only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogCandidate {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    /// Canonical release/first-air date string, `YYYY-MM-DD`
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

impl CatalogCandidate {
    /// Four-digit year prefix of the release date, when present
    pub fn release_year(&self) -> Option<&str> {
        self.release_date.as_deref().and_then(|d| d.get(..4))
    }
}

/// Candidate enriched by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDetails {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub runtime_minutes: Option<u32>,
    pub season_count: Option<u32>,
}

impl From<CatalogCandidate> for MediaDetails {
    /// Fallback used when the detail fetch fails: the bare search hit
    /// carries enough to present the selection.
    fn from(candidate: CatalogCandidate) -> Self {
        Self {
            id: candidate.id,
            kind: candidate.kind,
            title: candidate.title,
            release_date: candidate.release_date,
            overview: candidate.overview,
            poster_path: candidate.poster_path,
            vote_average: candidate.vote_average,
            genres: Vec::new(),
            runtime_minutes: None,
            season_count: None,
        }
    }
}

/// One watch provider inside a region payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchProvider {
    pub provider_id: u64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// Region-scoped watch-provider payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderRegion {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<WatchProvider>,
    #[serde(default)]
    pub rent: Vec<WatchProvider>,
    #[serde(default)]
    pub buy: Vec<WatchProvider>,
}

// ============================================================================
// TMDB wire types
// ============================================================================

/// Raw `/search/multi` hit. Movies use `title`/`release_date`, TV uses
/// `name`/`first_air_date`; anything that is not movie/tv is dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl TmdbSearchResult {
    pub fn kind(&self) -> Option<MediaKind> {
        match self.media_type.as_str() {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }

    /// Converts to a candidate, or `None` for person/collection hits
    pub fn into_candidate(self) -> Option<CatalogCandidate> {
        let kind = self.kind()?;
        let title = self.title.or(self.name).filter(|t| !t.is_empty())?;
        let release_date = self
            .release_date
            .or(self.first_air_date)
            .filter(|d| !d.is_empty());

        Some(CatalogCandidate {
            id: self.id,
            kind,
            title,
            release_date,
            overview: self.overview,
            poster_path: self.poster_path,
            vote_average: self.vote_average,
        })
    }
}

/// Raw `/{kind}/{id}` detail response
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

impl TmdbDetails {
    pub fn into_details(self, kind: MediaKind) -> MediaDetails {
        MediaDetails {
            id: self.id,
            kind,
            title: self.title.or(self.name).unwrap_or_default(),
            release_date: self
                .release_date
                .or(self.first_air_date)
                .filter(|d| !d.is_empty()),
            overview: self.overview,
            poster_path: self.poster_path,
            vote_average: self.vote_average,
            genres: self.genres.into_iter().map(|g| g.name).collect(),
            runtime_minutes: self.runtime,
            season_count: self.number_of_seasons,
        }
    }
}

/// Raw `/{kind}/{id}/watch/providers` response: region code → payload
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, ProviderRegion>,
}
