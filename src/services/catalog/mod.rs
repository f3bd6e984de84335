use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Media catalog abstraction
///
/// The selection engine talks to the catalog only through this trait so
/// tests can script search results and failures. Every method is allowed
/// to fail; callers degrade to "no data" instead of surfacing catalog
/// errors to the user.
use crate::{
    error::AppResult,
    models::{CatalogCandidate, MediaDetails, MediaKind, ProviderRegion},
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Searches movies and TV shows by free-text query.
    ///
    /// Returns at most ten candidates in catalog relevance order; hits
    /// that are neither movies nor TV shows are dropped.
    async fn search_multi(&self, query: &str) -> AppResult<Vec<CatalogCandidate>>;

    /// Fetches the full record for one candidate
    async fn details(&self, id: u64, kind: MediaKind) -> AppResult<MediaDetails>;

    /// Fetches the configured region's watch providers for one candidate.
    ///
    /// `None` when the catalog has no payload for the region.
    async fn watch_providers(
        &self,
        id: u64,
        kind: MediaKind,
    ) -> AppResult<Option<ProviderRegion>>;
}
