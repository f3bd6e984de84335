use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Remote document store abstraction
///
/// Documents are named, folder-scoped, and updated by exact-text line
/// replacement or full-content upload. Every call carries the session it
/// is authorized by; without one the store is unreachable.
use crate::{
    error::AppResult,
    models::{CommitStrategy, DocumentHandle, FolderHandle, Page},
    services::session::Session,
};

pub mod drive;

pub use drive::DriveStore;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Looks a document up by exact name inside a folder
    async fn find_document(
        &self,
        session: &Session,
        name: &str,
        folder_id: &str,
    ) -> AppResult<Option<DocumentHandle>>;

    /// Lists child folders of a parent, one page at a time
    async fn list_folders<'a>(
        &self,
        session: &Session,
        parent_id: &str,
        page_token: Option<&'a str>,
    ) -> AppResult<Page<FolderHandle>>;

    async fn create_folder<'a>(
        &self,
        session: &Session,
        name: &str,
        parent_id: Option<&'a str>,
    ) -> AppResult<FolderHandle>;

    async fn create_document<'a>(
        &self,
        session: &Session,
        name: &str,
        folder_id: &str,
        initial_text: Option<&'a str>,
    ) -> AppResult<DocumentHandle>;

    /// Lists the bindable documents of a folder, one page at a time
    async fn list_documents<'a>(
        &self,
        session: &Session,
        folder_id: &str,
        page_token: Option<&'a str>,
    ) -> AppResult<Page<DocumentHandle>>;

    /// Reads the document's full text content
    async fn read_text(&self, session: &Session, handle: &DocumentHandle) -> AppResult<String>;

    /// Replaces one exact text occurrence in place.
    ///
    /// Fails with `RemoteNotFound` when `old_text` is not present verbatim.
    async fn replace_exact_text(
        &self,
        session: &Session,
        handle: &DocumentHandle,
        old_text: &str,
        new_text: &str,
    ) -> AppResult<()>;

    /// Appends a line to the end of the document
    async fn append_text(
        &self,
        session: &Session,
        handle: &DocumentHandle,
        text: &str,
    ) -> AppResult<()>;

    /// Replaces the document's full content
    async fn write_text(
        &self,
        session: &Session,
        handle: &DocumentHandle,
        content: &str,
    ) -> AppResult<()>;

    /// How line changes are committed to this document. A capability of
    /// the document itself, decided by mime type, queried once at bind.
    fn commit_strategy(&self, handle: &DocumentHandle) -> CommitStrategy {
        CommitStrategy::for_mime(&handle.mime_type)
    }
}
