use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use roleta_api::api::{create_router, AppState};
use roleta_api::config::Config;
use roleta_api::db::{create_redis_client, Cache, RedisPointerStore};
use roleta_api::services::catalog::TmdbCatalog;
use roleta_api::services::reconciler::Reconciler;
use roleta_api::services::selection::OsEntropyPicker;
use roleta_api::services::session::ConfiguredTokenAuthorizer;
use roleta_api::services::storage::DriveStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client.clone());

    let catalog = Arc::new(TmdbCatalog::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_language.clone(),
        config.provider_region.clone(),
    ));
    let store = Arc::new(DriveStore::new(
        config.drive_api_url.clone(),
        config.docs_api_url.clone(),
        config.upload_api_url.clone(),
    ));
    let authorizer = Arc::new(ConfiguredTokenAuthorizer::new(
        config.drive_access_token.clone(),
    ));
    let pointer_store = Arc::new(RedisPointerStore::new(redis_client));

    let reconciler = Reconciler::new(
        store,
        catalog,
        Arc::new(OsEntropyPicker),
        authorizer,
        pointer_store,
    );

    let state = AppState::new(reconciler);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "roleta-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
