/// TMDB catalog client
///
/// Search goes through `/search/multi` so one query covers movies and TV;
/// details and watch providers hit the kind-scoped endpoints. Responses
/// are cached in redis to keep repeated picks of the same title cheap.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        CatalogCandidate, MediaDetails, MediaKind, ProviderRegion, TmdbDetails,
        TmdbProvidersResponse, TmdbSearchResult,
    },
    services::catalog::CatalogProvider,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 604800; // 1 week
const PROVIDERS_CACHE_TTL: u64 = 86400; // 1 day
const MAX_CANDIDATES: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TmdbSearchResult>,
}

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    region: String,
    cache: Cache,
}

impl TmdbCatalog {
    pub fn new(
        cache: Cache,
        api_key: String,
        api_url: String,
        language: String,
        region: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            language,
            region,
            cache,
        }
    }

    fn to_candidates(results: Vec<TmdbSearchResult>) -> Vec<CatalogCandidate> {
        results
            .into_iter()
            .filter_map(TmdbSearchResult::into_candidate)
            .take(MAX_CANDIDATES)
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbCatalog {
    async fn search_multi(&self, query: &str) -> AppResult<Vec<CatalogCandidate>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::Search(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let url = format!("{}/search/multi", self.api_url);

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("api_key", self.api_key.as_str()),
                        ("language", self.language.as_str()),
                        ("query", query),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::CatalogUnavailable(format!(
                        "TMDB search returned status {}: {}",
                        status, body
                    )));
                }

                let search: SearchResponse = response.json().await?;
                let candidates = Self::to_candidates(search.results);

                tracing::info!(
                    query = %query,
                    results = candidates.len(),
                    provider = "tmdb",
                    "Catalog search completed"
                );

                Ok(candidates)
            }
        )
    }

    async fn details(&self, id: u64, kind: MediaKind) -> AppResult<MediaDetails> {
        cached!(
            self.cache,
            CacheKey::Details(id, kind),
            DETAILS_CACHE_TTL,
            async move {
                let url = format!("{}/{}/{}", self.api_url, kind.as_path(), id);

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("api_key", self.api_key.as_str()),
                        ("language", self.language.as_str()),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::CatalogUnavailable(format!(
                        "TMDB details returned status {}: {}",
                        status, body
                    )));
                }

                let details: TmdbDetails = response.json().await?;
                let details = details.into_details(kind);

                tracing::info!(
                    id = id,
                    kind = kind.as_path(),
                    provider = "tmdb",
                    "Catalog details fetched"
                );

                Ok(details)
            }
        )
    }

    async fn watch_providers(
        &self,
        id: u64,
        kind: MediaKind,
    ) -> AppResult<Option<ProviderRegion>> {
        cached!(
            self.cache,
            CacheKey::Providers(id, kind),
            PROVIDERS_CACHE_TTL,
            async move {
                let url = format!(
                    "{}/{}/{}/watch/providers",
                    self.api_url,
                    kind.as_path(),
                    id
                );

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[("api_key", self.api_key.as_str())])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::CatalogUnavailable(format!(
                        "TMDB providers returned status {}: {}",
                        status, body
                    )));
                }

                let mut payload: TmdbProvidersResponse = response.json().await?;
                let region = payload.results.remove(&self.region);

                tracing::info!(
                    id = id,
                    kind = kind.as_path(),
                    region = %self.region,
                    found = region.is_some(),
                    provider = "tmdb",
                    "Watch providers fetched"
                );

                Ok(region)
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_result(id: u64, media_type: &str, title: &str) -> TmdbSearchResult {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "media_type": media_type,
            "title": title,
        }))
        .unwrap()
    }

    #[test]
    fn test_to_candidates_drops_non_media_hits() {
        let results = vec![
            search_result(1, "movie", "The Matrix"),
            search_result(2, "person", "Keanu Reeves"),
            search_result(3, "tv", "The Matrix Recap"),
        ];

        let candidates = TmdbCatalog::to_candidates(results);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, 1);
        assert_eq!(candidates[1].id, 3);
    }

    #[test]
    fn test_to_candidates_bounds_result_count() {
        let results: Vec<TmdbSearchResult> = (0..25)
            .map(|i| search_result(i, "movie", "Hit"))
            .collect();

        let candidates = TmdbCatalog::to_candidates(results);
        assert_eq!(candidates.len(), 10);
        assert_eq!(candidates[0].id, 0);
        assert_eq!(candidates[9].id, 9);
    }

    #[test]
    fn test_to_candidates_preserves_relevance_order() {
        let results = vec![
            search_result(42, "tv", "First"),
            search_result(7, "movie", "Second"),
        ];

        let candidates = TmdbCatalog::to_candidates(results);
        assert_eq!(candidates[0].id, 42);
        assert_eq!(candidates[1].id, 7);
    }
}
