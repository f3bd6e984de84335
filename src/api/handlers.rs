use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::{
    CatalogCandidate, DocumentHandle, Entry, FolderHandle, MediaDetails, Page, ProviderRegion,
    RatingKind, Selection,
};
use crate::services::reconciler::{Reconciler, SessionPhase};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub phase: SessionPhase,
    pub folder_id: Option<String>,
    pub document: Option<DocumentHandle>,
    pub entry_count: usize,
    pub unwatched_count: usize,
    pub last_error: Option<String>,
}

impl From<&Reconciler> for SessionResponse {
    fn from(reconciler: &Reconciler) -> Self {
        Self {
            phase: reconciler.phase(),
            folder_id: reconciler.folder_id().map(str::to_string),
            document: reconciler.document().cloned(),
            entry_count: reconciler.entries().len(),
            unwatched_count: reconciler.entries().iter().filter(|e| !e.watched).count(),
            last_error: reconciler.last_error().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub display_title: String,
    pub title: String,
    pub entry_line: String,
    pub media: Option<MediaDetails>,
    pub alternatives: Vec<CatalogCandidate>,
    pub providers: Option<ProviderRegion>,
}

impl From<&Selection> for SelectionResponse {
    fn from(selection: &Selection) -> Self {
        Self {
            display_title: selection.display_title(),
            title: selection.title.clone(),
            entry_line: selection.entry_line.clone(),
            media: selection.media.clone(),
            alternatives: selection.alternatives.clone(),
            providers: selection.providers.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub committed_line: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectFolderRequest {
    pub folder_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BindDocumentRequest {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    pub initial_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub candidate: CatalogCandidate,
}

#[derive(Debug, Deserialize)]
pub struct SwitchSelectionRequest {
    pub candidate: CatalogCandidate,
}

#[derive(Debug, Deserialize)]
pub struct RateSelectionRequest {
    pub rating: RatingKind,
}

#[derive(Debug, Deserialize)]
pub struct FoldersQuery {
    pub parent_id: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentsQuery {
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FindDocumentQuery {
    pub name: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Current session snapshot
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let reconciler = state.reconciler.read().await;
    Json(SessionResponse::from(&*reconciler))
}

/// Authorize and restore the persisted binding
pub async fn login(State(state): State<AppState>) -> AppResult<Json<SessionResponse>> {
    let mut reconciler = state.reconciler.write().await;
    reconciler.login().await?;
    Ok(Json(SessionResponse::from(&*reconciler)))
}

/// Drop the session and the persisted pointers
pub async fn logout(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut reconciler = state.reconciler.write().await;
    reconciler.logout().await;
    Json(SessionResponse::from(&*reconciler))
}

/// Select the working folder, clearing any bound document
pub async fn select_folder(
    State(state): State<AppState>,
    Json(request): Json<SelectFolderRequest>,
) -> AppResult<Json<SessionResponse>> {
    let mut reconciler = state.reconciler.write().await;
    reconciler.select_folder(request.folder_id).await?;
    Ok(Json(SessionResponse::from(&*reconciler)))
}

/// Bind a document and load its content
pub async fn bind_document(
    State(state): State<AppState>,
    Json(request): Json<BindDocumentRequest>,
) -> AppResult<Json<SessionResponse>> {
    let handle = DocumentHandle {
        id: request.id,
        name: request.name,
        mime_type: request.mime_type,
    };

    let mut reconciler = state.reconciler.write().await;
    reconciler.bind_document(handle).await?;
    Ok(Json(SessionResponse::from(&*reconciler)))
}

/// Re-read the bound document from remote
pub async fn reload_document(State(state): State<AppState>) -> AppResult<Json<SessionResponse>> {
    let mut reconciler = state.reconciler.write().await;
    reconciler.reload().await?;
    Ok(Json(SessionResponse::from(&*reconciler)))
}

/// List child folders of a parent (the store root by default)
pub async fn list_folders(
    State(state): State<AppState>,
    Query(params): Query<FoldersQuery>,
) -> AppResult<Json<Page<FolderHandle>>> {
    let parent_id = params.parent_id.as_deref().unwrap_or("root");

    let mut reconciler = state.reconciler.write().await;
    let page = reconciler
        .list_folders(parent_id, params.page_token.as_deref())
        .await?;
    Ok(Json(page))
}

/// Create a folder
pub async fn create_folder(
    State(state): State<AppState>,
    Json(request): Json<CreateFolderRequest>,
) -> AppResult<(StatusCode, Json<FolderHandle>)> {
    let mut reconciler = state.reconciler.write().await;
    let folder = reconciler
        .create_folder(&request.name, request.parent_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// List bindable documents in the selected folder
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentsQuery>,
) -> AppResult<Json<Page<DocumentHandle>>> {
    let mut reconciler = state.reconciler.write().await;
    let page = reconciler
        .list_documents(params.page_token.as_deref())
        .await?;
    Ok(Json(page))
}

/// Create a document in the selected folder
pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<DocumentHandle>)> {
    let mut reconciler = state.reconciler.write().await;
    let document = reconciler
        .create_document(&request.name, request.initial_text.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Look a document up by exact name in the selected folder
pub async fn find_document(
    State(state): State<AppState>,
    Query(params): Query<FindDocumentQuery>,
) -> AppResult<Json<Option<DocumentHandle>>> {
    let mut reconciler = state.reconciler.write().await;
    let document = reconciler.find_document(&params.name).await?;
    Ok(Json(document))
}

/// The parsed watch-list
pub async fn get_list(State(state): State<AppState>) -> Json<Vec<Entry>> {
    let reconciler = state.reconciler.read().await;
    Json(reconciler.entries().to_vec())
}

/// Append a catalog record to the list
pub async fn add_item(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> AppResult<Json<Vec<Entry>>> {
    let mut reconciler = state.reconciler.write().await;
    reconciler.add_item(&request.candidate).await?;
    Ok(Json(reconciler.entries().to_vec()))
}

/// The live selection, if any
pub async fn get_selection(State(state): State<AppState>) -> Json<Option<SelectionResponse>> {
    let reconciler = state.reconciler.read().await;
    Json(reconciler.selection().map(SelectionResponse::from))
}

/// Pick a random unwatched entry; `null` when everything is watched
pub async fn pick_selection(
    State(state): State<AppState>,
) -> AppResult<Json<Option<SelectionResponse>>> {
    let mut reconciler = state.reconciler.write().await;
    let selection = reconciler.pick().await?;
    Ok(Json(selection.as_ref().map(SelectionResponse::from)))
}

/// Swap the live selection to an explicitly chosen candidate
pub async fn switch_selection(
    State(state): State<AppState>,
    Json(request): Json<SwitchSelectionRequest>,
) -> AppResult<Json<Option<SelectionResponse>>> {
    let mut reconciler = state.reconciler.write().await;
    reconciler.switch_selection(&request.candidate).await?;
    Ok(Json(reconciler.selection().map(SelectionResponse::from)))
}

/// Rate the live selection, writing the watched tag back to the document
pub async fn rate_selection(
    State(state): State<AppState>,
    Json(request): Json<RateSelectionRequest>,
) -> AppResult<Json<RateResponse>> {
    let mut reconciler = state.reconciler.write().await;
    let committed_line = reconciler.rate_selection(request.rating).await?;
    Ok(Json(RateResponse { committed_line }))
}
