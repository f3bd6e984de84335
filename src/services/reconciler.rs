use serde::Serialize;
use std::sync::Arc;

use crate::{
    db::pointers::PointerStore,
    error::{AppError, AppResult},
    models::{
        parse_list, CatalogCandidate, CommitStrategy, DocumentHandle, Entry, FolderHandle, Page,
        RatingKind, Selection, SessionPointers,
    },
    services::{
        catalog::CatalogProvider,
        selection::{self, IndexPicker, SelectionEngine},
        session::{Authorizer, Session},
        storage::DocumentStore,
    },
};

/// Where the session stands between authorization and a bound document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unauthorized,
    Authorizing,
    NoFolder,
    NoFile,
    Bound,
}

#[derive(Debug, Clone)]
struct BoundDocument {
    handle: DocumentHandle,
    /// Capability of the bound document, decided once at bind time
    strategy: CommitStrategy,
}

/// Owns the canonical in-memory list and keeps it consistent with the
/// remote document and the persisted pointers.
///
/// Every remote-mutating action has the same shape: compute the new line
/// from local state, issue exactly one remote write keyed on the entry's
/// current `cleaned_line`, and mutate local state only after the write is
/// confirmed. On failure local state is left at its pre-action values and
/// the error lands in the `last_error` slot; there are no automatic
/// retries.
pub struct Reconciler {
    store: Arc<dyn DocumentStore>,
    engine: SelectionEngine,
    authorizer: Arc<dyn Authorizer>,
    pointer_store: Arc<dyn PointerStore>,
    session: Option<Session>,
    phase: SessionPhase,
    folder_id: Option<String>,
    bound: Option<BoundDocument>,
    entries: Vec<Entry>,
    selection: Option<Selection>,
    last_error: Option<String>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<dyn CatalogProvider>,
        picker: Arc<dyn IndexPicker>,
        authorizer: Arc<dyn Authorizer>,
        pointer_store: Arc<dyn PointerStore>,
    ) -> Self {
        Self {
            store,
            engine: SelectionEngine::new(catalog, picker),
            authorizer,
            pointer_store,
            session: None,
            phase: SessionPhase::Unauthorized,
            folder_id: None,
            bound: None,
            entries: Vec::new(),
            selection: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn folder_id(&self) -> Option<&str> {
        self.folder_id.as_deref()
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.bound.as_ref().map(|b| &b.handle)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Authorizes a session and restores the persisted binding.
    ///
    /// A failed authorization returns the session to unauthorized. A
    /// restored document that fails to load leaves the session authorized
    /// with the folder selected; the load error stays in `last_error`.
    pub async fn login(&mut self) -> AppResult<()> {
        self.phase = SessionPhase::Authorizing;

        let session = match self.authorizer.authorize().await {
            Ok(session) => session,
            Err(e) => {
                self.phase = SessionPhase::Unauthorized;
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };
        self.session = Some(session);
        self.phase = SessionPhase::NoFolder;
        self.last_error = None;
        tracing::info!("Storage session authorized");

        let pointers = match self.pointer_store.load().await {
            Ok(pointers) => pointers,
            Err(e) => {
                tracing::warn!(error = %e, "Pointer restore failed, starting unbound");
                SessionPointers::default()
            }
        };

        if let Some(folder_id) = pointers.folder_id.clone() {
            self.folder_id = Some(folder_id);
            self.phase = SessionPhase::NoFile;

            if let Some(handle) = pointers.document() {
                if let Err(e) = self.bind_document(handle).await {
                    tracing::warn!(error = %e, "Restored document failed to load");
                }
            }
        }

        Ok(())
    }

    /// Drops the session, all derived state and the persisted pointers
    pub async fn logout(&mut self) {
        if let Err(e) = self.pointer_store.clear().await {
            tracing::warn!(error = %e, "Pointer clear failed during logout");
        }
        self.session = None;
        self.phase = SessionPhase::Unauthorized;
        self.folder_id = None;
        self.bound = None;
        self.entries.clear();
        self.selection = None;
        self.last_error = None;
    }

    /// Selects the working folder and clears any bound document
    pub async fn select_folder(&mut self, folder_id: String) -> AppResult<()> {
        self.require_session()?;

        self.folder_id = Some(folder_id.clone());
        self.bound = None;
        self.entries.clear();
        self.selection = None;
        self.phase = SessionPhase::NoFile;

        let pointers = SessionPointers {
            folder_id: Some(folder_id),
            ..Default::default()
        };
        if let Err(e) = self.pointer_store.save(&pointers).await {
            tracing::warn!(error = %e, "Pointer save failed");
        }

        Ok(())
    }

    /// Binds a document and immediately reloads its full content.
    ///
    /// Re-binding the same document re-runs the full reload; there is no
    /// partial or merge reload. On read failure the binding is dropped,
    /// the file pointers are cleared and the error is surfaced.
    pub async fn bind_document(&mut self, handle: DocumentHandle) -> AppResult<()> {
        self.require_session()?;
        self.require_folder()?;

        let strategy = self.store.commit_strategy(&handle);
        self.persist_pointers(Some(&handle)).await;

        tracing::info!(document = %handle.name, strategy = ?strategy, "Document bound");
        self.selection = None;
        self.bound = Some(BoundDocument { handle, strategy });
        self.phase = SessionPhase::Bound;

        self.reload().await
    }

    /// Re-reads the bound document and rebuilds the entry list from
    /// scratch. An unreadable bound document drops the binding.
    pub async fn reload(&mut self) -> AppResult<()> {
        let session = self.require_session()?;
        let bound = self.require_bound()?;

        match self.store.read_text(&session, &bound.handle).await {
            Ok(content) => {
                self.entries = parse_list(&content);
                self.last_error = None;
                tracing::info!(entries = self.entries.len(), "List reloaded");
                Ok(())
            }
            Err(e) => {
                self.bound = None;
                self.entries.clear();
                self.selection = None;
                self.phase = SessionPhase::NoFile;
                self.persist_pointers(None).await;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Appends a catalog record to the list, then reloads from remote.
    /// The reload, rather than a local append, keeps the in-memory copy
    /// aligned with whatever the document actually contains.
    pub async fn add_item(&mut self, candidate: &CatalogCandidate) -> AppResult<()> {
        let session = self.require_session()?;
        let bound = self.require_bound()?;
        let line = selection::format_media_line(candidate);

        if let Err(e) = self.store.append_text(&session, &bound.handle, &line).await {
            self.last_error = Some(e.to_string());
            return Err(e);
        }
        tracing::info!(line = %line, "Item appended");

        self.reload().await
    }

    /// Picks a random unwatched entry and makes it the live selection.
    /// `None` when every entry is watched.
    pub async fn pick(&mut self) -> AppResult<Option<Selection>> {
        self.require_bound()?;

        let selection = self.engine.pick(&self.entries).await;
        self.selection = selection.clone();
        Ok(selection)
    }

    /// Swaps the live selection to an explicitly chosen catalog candidate
    /// and rewrites the entry's document line as `Name (Year) [TYPE]`.
    pub async fn switch_selection(&mut self, candidate: &CatalogCandidate) -> AppResult<()> {
        let session = self.require_session()?;
        let bound = self.require_bound()?;
        let old_line = match &self.selection {
            Some(selection) => selection.entry_line.clone(),
            None => {
                return Err(AppError::InvalidInput("no live selection".to_string()));
            }
        };

        let outcome = self.engine.switch_to(candidate).await;

        if let Err(e) = self
            .commit_line_change(&session, &bound, &old_line, &outcome.line)
            .await
        {
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        if let Some(entry) = self.entries.iter_mut().find(|e| e.cleaned_line == old_line) {
            entry.apply_switch(&outcome.line);
        }
        if let Some(selection) = self.selection.as_mut() {
            selection.entry_line = outcome.line.clone();
            selection.title = outcome.line.clone();
            selection.media = Some(outcome.media);
            selection.providers = outcome.providers;
        }
        self.last_error = None;
        tracing::info!(line = %outcome.line, "Selection switched");

        Ok(())
    }

    /// Tags the selected entry as watched with the rating's fixed tag.
    /// The selection stays live when the write fails, so the same rating
    /// can be retried.
    pub async fn rate_selection(&mut self, rating: RatingKind) -> AppResult<String> {
        let session = self.require_session()?;
        let bound = self.require_bound()?;
        let entry_line = match &self.selection {
            Some(selection) => selection.entry_line.clone(),
            None => {
                return Err(AppError::InvalidInput("no live selection".to_string()));
            }
        };

        let Some(index) = self.entries.iter().position(|e| e.cleaned_line == entry_line) else {
            return Err(AppError::Internal(
                "selection does not match any entry".to_string(),
            ));
        };
        let committed = selection::rated_line(&self.entries[index], rating);

        if let Err(e) = self
            .commit_line_change(&session, &bound, &entry_line, &committed)
            .await
        {
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        self.entries[index].apply_rating(&committed);
        self.selection = None;
        self.last_error = None;
        tracing::info!(line = %committed, "Selection rated");

        Ok(committed)
    }

    pub async fn find_document(&mut self, name: &str) -> AppResult<Option<DocumentHandle>> {
        let session = self.require_session()?;
        let folder_id = self.require_folder()?;
        let result = self.store.find_document(&session, name, &folder_id).await;
        self.note(result)
    }

    pub async fn list_folders(
        &mut self,
        parent_id: &str,
        page_token: Option<&str>,
    ) -> AppResult<Page<FolderHandle>> {
        let session = self.require_session()?;
        let result = self.store.list_folders(&session, parent_id, page_token).await;
        self.note(result)
    }

    pub async fn create_folder(
        &mut self,
        name: &str,
        parent_id: Option<&str>,
    ) -> AppResult<FolderHandle> {
        let session = self.require_session()?;
        let result = self.store.create_folder(&session, name, parent_id).await;
        self.note(result)
    }

    pub async fn list_documents(
        &mut self,
        page_token: Option<&str>,
    ) -> AppResult<Page<DocumentHandle>> {
        let session = self.require_session()?;
        let folder_id = self.require_folder()?;
        let result = self
            .store
            .list_documents(&session, &folder_id, page_token)
            .await;
        self.note(result)
    }

    pub async fn create_document(
        &mut self,
        name: &str,
        initial_text: Option<&str>,
    ) -> AppResult<DocumentHandle> {
        let session = self.require_session()?;
        let folder_id = self.require_folder()?;
        let result = self
            .store
            .create_document(&session, name, &folder_id, initial_text)
            .await;
        self.note(result)
    }

    /// One write, dispatched by the capability recorded at bind time
    async fn commit_line_change(
        &self,
        session: &Session,
        bound: &BoundDocument,
        old_line: &str,
        new_line: &str,
    ) -> AppResult<()> {
        match bound.strategy {
            CommitStrategy::StructuredReplace => {
                self.store
                    .replace_exact_text(session, &bound.handle, old_line, new_line)
                    .await
            }
            CommitStrategy::ReadModifyWrite => {
                let content = self.store.read_text(session, &bound.handle).await?;
                if !content.contains(old_line) {
                    return Err(AppError::RemoteNotFound(format!(
                        "line not present in document: {}",
                        old_line
                    )));
                }
                let updated = content.replacen(old_line, new_line, 1);
                self.store.write_text(session, &bound.handle, &updated).await
            }
        }
    }

    async fn persist_pointers(&self, document: Option<&DocumentHandle>) {
        let pointers = SessionPointers {
            folder_id: self.folder_id.clone(),
            file_id: document.map(|d| d.id.clone()),
            file_name: document.map(|d| d.name.clone()),
            file_mime: document.map(|d| d.mime_type.clone()),
        };
        if let Err(e) = self.pointer_store.save(&pointers).await {
            tracing::warn!(error = %e, "Pointer save failed");
        }
    }

    fn require_session(&self) -> AppResult<Session> {
        self.session
            .clone()
            .ok_or_else(|| AppError::NotAuthorized("login required".to_string()))
    }

    fn require_folder(&self) -> AppResult<String> {
        self.folder_id
            .clone()
            .ok_or_else(|| AppError::InvalidInput("no folder selected".to_string()))
    }

    fn require_bound(&self) -> AppResult<BoundDocument> {
        self.bound
            .clone()
            .ok_or_else(|| AppError::InvalidInput("no document bound".to_string()))
    }

    /// Storage outcomes feed the last-error slot: every failure
    /// overwrites it, every success clears it
    fn note<T>(&mut self, result: AppResult<T>) -> AppResult<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => self.last_error = Some(e.to_string()),
        }
        result
    }
}
