use axum::{
    body::Body,
    http::Request,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %Uuid::new_v4(),
        )
    });

    Router::new()
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/session", get(handlers::get_session))
        .route("/session/login", post(handlers::login))
        .route("/session/logout", post(handlers::logout))
        .route("/session/folder", put(handlers::select_folder))
        .route("/session/document", put(handlers::bind_document))
        .route("/session/document/reload", post(handlers::reload_document))
        // Remote store browsing
        .route(
            "/folders",
            get(handlers::list_folders).post(handlers::create_folder),
        )
        .route(
            "/documents",
            get(handlers::list_documents).post(handlers::create_document),
        )
        .route("/documents/find", get(handlers::find_document))
        // Watch-list
        .route("/list", get(handlers::get_list))
        .route("/list/items", post(handlers::add_item))
        // Selection
        .route("/selection", get(handlers::get_selection))
        .route("/selection/pick", post(handlers::pick_selection))
        .route("/selection/switch", post(handlers::switch_selection))
        .route("/selection/rate", post(handlers::rate_selection))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
