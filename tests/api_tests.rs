use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{json, Value};

use roleta_api::api::{create_router, AppState};
use roleta_api::db::pointers::PointerStore;
use roleta_api::error::{AppError, AppResult};
use roleta_api::models::{
    CatalogCandidate, DocumentHandle, FolderHandle, MediaDetails, MediaKind, Page, ProviderRegion,
    SessionPointers, WatchProvider, GOOGLE_DOC_MIME,
};
use roleta_api::services::catalog::CatalogProvider;
use roleta_api::services::reconciler::Reconciler;
use roleta_api::services::selection::IndexPicker;
use roleta_api::services::session::{Authorizer, Session};
use roleta_api::services::storage::DocumentStore;

const DOC_ID: &str = "file-1";
const DOC_NAME: &str = "lista-filmes-series";

/// Document store over one in-memory document, shared with the test body
/// so external edits can be simulated
#[derive(Clone)]
struct FakeStore {
    content: Arc<Mutex<String>>,
}

impl FakeStore {
    fn handle(&self) -> DocumentHandle {
        DocumentHandle {
            id: DOC_ID.to_string(),
            name: DOC_NAME.to_string(),
            mime_type: GOOGLE_DOC_MIME.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn find_document(
        &self,
        _session: &Session,
        name: &str,
        _folder_id: &str,
    ) -> AppResult<Option<DocumentHandle>> {
        Ok((name == DOC_NAME).then(|| self.handle()))
    }

    async fn list_folders<'a>(
        &self,
        _session: &Session,
        _parent_id: &str,
        _page_token: Option<&'a str>,
    ) -> AppResult<Page<FolderHandle>> {
        Ok(Page {
            items: vec![FolderHandle {
                id: "folder-1".to_string(),
                name: "Filmes".to_string(),
            }],
            next_page_token: None,
        })
    }

    async fn create_folder<'a>(
        &self,
        _session: &Session,
        name: &str,
        _parent_id: Option<&'a str>,
    ) -> AppResult<FolderHandle> {
        Ok(FolderHandle {
            id: "folder-new".to_string(),
            name: name.to_string(),
        })
    }

    async fn create_document<'a>(
        &self,
        _session: &Session,
        name: &str,
        _folder_id: &str,
        initial_text: Option<&'a str>,
    ) -> AppResult<DocumentHandle> {
        *self.content.lock().unwrap() = initial_text.unwrap_or_default().to_string();
        Ok(DocumentHandle {
            id: DOC_ID.to_string(),
            name: name.to_string(),
            mime_type: GOOGLE_DOC_MIME.to_string(),
        })
    }

    async fn list_documents<'a>(
        &self,
        _session: &Session,
        _folder_id: &str,
        _page_token: Option<&'a str>,
    ) -> AppResult<Page<DocumentHandle>> {
        Ok(Page {
            items: vec![self.handle()],
            next_page_token: None,
        })
    }

    async fn read_text(
        &self,
        _session: &Session,
        _handle: &DocumentHandle,
    ) -> AppResult<String> {
        Ok(self.content.lock().unwrap().clone())
    }

    async fn replace_exact_text(
        &self,
        _session: &Session,
        _handle: &DocumentHandle,
        old_text: &str,
        new_text: &str,
    ) -> AppResult<()> {
        let mut content = self.content.lock().unwrap();
        if !content.contains(old_text) {
            return Err(AppError::RemoteNotFound(format!(
                "text not present in document: {}",
                old_text
            )));
        }
        *content = content.replacen(old_text, new_text, 1);
        Ok(())
    }

    async fn append_text(
        &self,
        _session: &Session,
        _handle: &DocumentHandle,
        text: &str,
    ) -> AppResult<()> {
        let mut content = self.content.lock().unwrap();
        content.push('\n');
        content.push_str(text);
        Ok(())
    }

    async fn write_text(
        &self,
        _session: &Session,
        _handle: &DocumentHandle,
        content: &str,
    ) -> AppResult<()> {
        *self.content.lock().unwrap() = content.to_string();
        Ok(())
    }
}

/// Two fixed TV hits, enough to resolve and to switch to the runner-up
struct FakeCatalog;

fn fake_candidate(id: u64, title: &str, date: &str) -> CatalogCandidate {
    CatalogCandidate {
        id,
        kind: MediaKind::Tv,
        title: title.to_string(),
        release_date: Some(date.to_string()),
        overview: None,
        poster_path: None,
        vote_average: Some(8.5),
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn search_multi(&self, _query: &str) -> AppResult<Vec<CatalogCandidate>> {
        Ok(vec![
            fake_candidate(1396, "Breaking Bad", "2008-01-20"),
            fake_candidate(62560, "Mr. Robot", "2015-06-24"),
        ])
    }

    async fn details(&self, id: u64, kind: MediaKind) -> AppResult<MediaDetails> {
        let title = if id == 62560 { "Mr. Robot" } else { "Breaking Bad" };
        Ok(MediaDetails {
            id,
            kind,
            title: title.to_string(),
            release_date: Some("2008-01-20".to_string()),
            overview: Some("High school chemistry teacher turns to crime.".to_string()),
            poster_path: None,
            vote_average: Some(8.9),
            genres: vec!["Drama".to_string()],
            runtime_minutes: None,
            season_count: Some(5),
        })
    }

    async fn watch_providers(
        &self,
        _id: u64,
        _kind: MediaKind,
    ) -> AppResult<Option<ProviderRegion>> {
        Ok(Some(ProviderRegion {
            link: Some("https://www.themoviedb.org/tv/1396/watch".to_string()),
            flatrate: vec![WatchProvider {
                provider_id: 8,
                provider_name: "Netflix".to_string(),
                logo_path: None,
            }],
            rent: Vec::new(),
            buy: Vec::new(),
        }))
    }
}

struct FakeAuthorizer;

#[async_trait]
impl Authorizer for FakeAuthorizer {
    async fn authorize(&self) -> AppResult<Session> {
        Ok(Session::new("test-token".to_string()))
    }
}

#[derive(Default)]
struct FakePointers {
    stored: Mutex<SessionPointers>,
}

#[async_trait]
impl PointerStore for FakePointers {
    async fn load(&self) -> AppResult<SessionPointers> {
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, pointers: &SessionPointers) -> AppResult<()> {
        *self.stored.lock().unwrap() = pointers.clone();
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.stored.lock().unwrap() = SessionPointers::default();
        Ok(())
    }
}

/// Deterministic stand-in for the entropy picker
struct ZeroPicker;

impl IndexPicker for ZeroPicker {
    fn pick_index(&self, _len: usize) -> usize {
        0
    }
}

fn create_test_server(content: &str) -> (TestServer, Arc<Mutex<String>>) {
    let content = Arc::new(Mutex::new(content.to_string()));
    let store = FakeStore {
        content: content.clone(),
    };

    let reconciler = Reconciler::new(
        Arc::new(store),
        Arc::new(FakeCatalog),
        Arc::new(ZeroPicker),
        Arc::new(FakeAuthorizer),
        Arc::new(FakePointers::default()),
    );

    let server = TestServer::new(create_router(AppState::new(reconciler))).unwrap();
    (server, content)
}

async fn login_and_bind(server: &TestServer) {
    server.post("/session/login").await.assert_status_ok();
    server
        .put("/session/folder")
        .json(&json!({ "folder_id": "folder-1" }))
        .await
        .assert_status_ok();
    server
        .put("/session/document")
        .json(&json!({
            "id": DOC_ID,
            "name": DOC_NAME,
            "mime_type": GOOGLE_DOC_MIME,
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server("");
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_storage_routes_require_login() {
    let (server, _) = create_test_server("Breaking Bad\n");

    let response = server
        .put("/session/folder")
        .json(&json!({ "folder_id": "folder-1" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let response = server.get("/folders").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bind_parses_list() {
    let (server, _) = create_test_server("Breaking Bad\nDune (2021) [FILME] [ASSISTIDO: BOM]\n");
    login_and_bind(&server).await;

    let session: Value = server.get("/session").await.json();
    assert_eq!(session["phase"], "bound");
    assert_eq!(session["entry_count"], 2);
    assert_eq!(session["unwatched_count"], 1);

    let list: Value = server.get("/list").await.json();
    assert_eq!(list[0]["cleaned_line"], "Breaking Bad");
    assert_eq!(list[0]["watched"], false);
    assert_eq!(list[1]["watched"], true);
    assert_eq!(list[1]["title"], "Dune (2021) [FILME]");
}

#[tokio::test]
async fn test_pick_then_rate_flow() {
    let (server, content) = create_test_server("Breaking Bad\nDune [ASSISTIDO]\n");
    login_and_bind(&server).await;

    let selection: Value = server.post("/selection/pick").await.json();
    assert_eq!(selection["display_title"], "Breaking Bad");
    assert_eq!(selection["media"]["id"], 1396);
    assert_eq!(selection["alternatives"].as_array().unwrap().len(), 2);
    assert_eq!(
        selection["providers"]["flatrate"][0]["provider_name"],
        "Netflix"
    );

    let rated: Value = server
        .post("/selection/rate")
        .json(&json!({ "rating": "positive" }))
        .await
        .json();
    assert_eq!(rated["committed_line"], "Breaking Bad [ASSISTIDO: BOM]");

    assert!(content
        .lock()
        .unwrap()
        .contains("Breaking Bad [ASSISTIDO: BOM]"));

    let list: Value = server.get("/list").await.json();
    assert_eq!(list[0]["watched"], true);
    assert_eq!(list[0]["cleaned_line"], "Breaking Bad [ASSISTIDO: BOM]");

    // Rating consumes the selection
    let selection: Value = server.get("/selection").await.json();
    assert!(selection.is_null());

    let session: Value = server.get("/session").await.json();
    assert!(session["last_error"].is_null());
}

#[tokio::test]
async fn test_switch_rewrites_document_line() {
    let (server, content) = create_test_server("Breaking Bad\n");
    login_and_bind(&server).await;

    server.post("/selection/pick").await.assert_status_ok();

    let selection: Value = server
        .post("/selection/switch")
        .json(&json!({
            "candidate": {
                "id": 62560,
                "kind": "tv",
                "title": "Mr. Robot",
                "release_date": "2015-06-24",
            }
        }))
        .await
        .json();

    assert_eq!(selection["title"], "Mr. Robot (2015) [SÉRIE]");
    assert_eq!(selection["display_title"], "Mr. Robot (2015)");
    assert_eq!(selection["media"]["id"], 62560);

    assert!(content.lock().unwrap().contains("Mr. Robot (2015) [SÉRIE]"));

    let list: Value = server.get("/list").await.json();
    assert_eq!(list[0]["cleaned_line"], "Mr. Robot (2015) [SÉRIE]");
}

#[tokio::test]
async fn test_add_item_appends_and_reloads() {
    let (server, content) = create_test_server("Breaking Bad\n");
    login_and_bind(&server).await;

    let list: Value = server
        .post("/list/items")
        .json(&json!({
            "candidate": {
                "id": 62560,
                "kind": "tv",
                "title": "Mr. Robot",
                "release_date": "2015-06-24",
            }
        }))
        .await
        .json();

    let lines = list.as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["cleaned_line"], "Mr. Robot (2015) [SÉRIE]");
    assert!(content.lock().unwrap().contains("Mr. Robot (2015) [SÉRIE]"));
}

#[tokio::test]
async fn test_rate_conflict_leaves_local_state_untouched() {
    let (server, content) = create_test_server("Breaking Bad\n");
    login_and_bind(&server).await;

    server.post("/selection/pick").await.assert_status_ok();

    // An external edit removes the line between pick and rate
    *content.lock().unwrap() = "Something Else Entirely\n".to_string();

    let response = server
        .post("/selection/rate")
        .json(&json!({ "rating": "heart" }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let list: Value = server.get("/list").await.json();
    assert_eq!(list[0]["cleaned_line"], "Breaking Bad");
    assert_eq!(list[0]["watched"], false);

    // The selection stays live for a retry, the failure is on record
    let selection: Value = server.get("/selection").await.json();
    assert!(!selection.is_null());

    let session: Value = server.get("/session").await.json();
    assert!(session["last_error"]
        .as_str()
        .unwrap()
        .contains("not present"));
}

#[tokio::test]
async fn test_pick_with_everything_watched_returns_null() {
    let (server, _) = create_test_server("Dune [ASSISTIDO]\nSeven [WATCHED]\n");
    login_and_bind(&server).await;

    let selection: Value = server.post("/selection/pick").await.json();
    assert!(selection.is_null());
}

#[tokio::test]
async fn test_rebind_yields_identical_list() {
    let (server, _) = create_test_server("Breaking Bad\nInterstellar\n");
    login_and_bind(&server).await;

    let first: Value = server.get("/list").await.json();

    server
        .put("/session/document")
        .json(&json!({
            "id": DOC_ID,
            "name": DOC_NAME,
            "mime_type": GOOGLE_DOC_MIME,
        }))
        .await
        .assert_status_ok();

    let second: Value = server.get("/list").await.json();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_create_document_then_bind() {
    let (server, _) = create_test_server("");
    server.post("/session/login").await.assert_status_ok();
    server
        .put("/session/folder")
        .json(&json!({ "folder_id": "folder-1" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/documents")
        .json(&json!({ "name": "nova-lista", "initial_text": "Inception\n" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let document: Value = response.json();
    assert_eq!(document["name"], "nova-lista");

    server
        .put("/session/document")
        .json(&json!({
            "id": document["id"],
            "name": document["name"],
            "mime_type": document["mime_type"],
        }))
        .await
        .assert_status_ok();

    let list: Value = server.get("/list").await.json();
    assert_eq!(list[0]["cleaned_line"], "Inception");
}

#[tokio::test]
async fn test_logout_resets_session() {
    let (server, _) = create_test_server("Breaking Bad\n");
    login_and_bind(&server).await;

    let session: Value = server.post("/session/logout").await.json();
    assert_eq!(session["phase"], "unauthorized");
    assert_eq!(session["entry_count"], 0);
    assert!(session["document"].is_null());
}
