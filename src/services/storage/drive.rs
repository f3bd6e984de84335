/// Google Drive / Docs document store
///
/// Drive v3 carries the folder/file metadata operations and plain-text
/// content transfer; rich documents are read through `files.export` and
/// written through the Docs v1 `batchUpdate` requests. Replacement is
/// keyed on exact text (`matchCase`), so a stale line yields zero
/// occurrences and is reported as `RemoteNotFound` instead of silently
/// doing nothing.
use crate::{
    error::{AppError, AppResult},
    models::{DocumentHandle, FolderHandle, Page, GOOGLE_DOC_MIME, PLAIN_TEXT_MIME},
    services::session::Session,
    services::storage::DocumentStore,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const FOLDER_PAGE_SIZE: u32 = 100;
const DOCUMENT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<BatchUpdateReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateReply {
    #[serde(default)]
    replace_all_text: Option<ReplaceAllTextReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceAllTextReply {
    #[serde(default)]
    occurrences_changed: Option<u32>,
}

impl From<DriveFile> for DocumentHandle {
    fn from(file: DriveFile) -> Self {
        Self {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
        }
    }
}

impl From<DriveFile> for FolderHandle {
    fn from(file: DriveFile) -> Self {
        Self {
            id: file.id,
            name: file.name,
        }
    }
}

/// Escapes a value for interpolation into a Drive query string
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn document_by_name_query(name: &str, folder_id: &str) -> String {
    format!(
        "name = '{}' and mimeType != '{}' and trashed = false and '{}' in parents",
        escape_query_value(name),
        FOLDER_MIME,
        escape_query_value(folder_id)
    )
}

fn folders_query(parent_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType = '{}' and trashed = false",
        escape_query_value(parent_id),
        FOLDER_MIME
    )
}

fn documents_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and (mimeType = '{}' or mimeType = '{}') and trashed = false",
        escape_query_value(folder_id),
        GOOGLE_DOC_MIME,
        PLAIN_TEXT_MIME
    )
}

#[derive(Clone)]
pub struct DriveStore {
    http_client: HttpClient,
    drive_api_url: String,
    docs_api_url: String,
    upload_api_url: String,
}

impl DriveStore {
    pub fn new(drive_api_url: String, docs_api_url: String, upload_api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            drive_api_url,
            docs_api_url,
            upload_api_url,
        }
    }

    async fn read_error(op: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::ReadFailure(format!("{} returned status {}: {}", op, status, body))
    }

    async fn write_error(op: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::WriteFailure(format!("{} returned status {}: {}", op, status, body))
    }

    async fn list_files(
        &self,
        session: &Session,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
        fields: &str,
    ) -> AppResult<DriveFileList> {
        let url = format!("{}/files", self.drive_api_url);
        let page_size = page_size.to_string();
        let mut params = vec![
            ("q", query),
            ("pageSize", page_size.as_str()),
            ("fields", fields),
            ("orderBy", "name"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(session.bearer())
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error("files.list", response).await);
        }

        Ok(response.json().await?)
    }

    async fn docs_batch_update(
        &self,
        session: &Session,
        document_id: &str,
        requests: serde_json::Value,
    ) -> AppResult<BatchUpdateResponse> {
        let url = format!("{}/documents/{}:batchUpdate", self.docs_api_url, document_id);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(session.bearer())
            .json(&json!({ "requests": requests }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::write_error("documents.batchUpdate", response).await);
        }

        Ok(response.json().await?)
    }

    async fn upload_content(
        &self,
        session: &Session,
        file_id: &str,
        content: &str,
    ) -> AppResult<()> {
        let url = format!("{}/files/{}", self.upload_api_url, file_id);

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(session.bearer())
            .query(&[("uploadType", "media")])
            .header(reqwest::header::CONTENT_TYPE, PLAIN_TEXT_MIME)
            .body(content.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::write_error("files.update media", response).await);
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for DriveStore {
    async fn find_document(
        &self,
        session: &Session,
        name: &str,
        folder_id: &str,
    ) -> AppResult<Option<DocumentHandle>> {
        let query = document_by_name_query(name, folder_id);
        let list = self
            .list_files(
                session,
                &query,
                10,
                None,
                "nextPageToken, files(id, name, mimeType)",
            )
            .await?;

        Ok(list.files.into_iter().next().map(DocumentHandle::from))
    }

    async fn list_folders<'a>(
        &self,
        session: &Session,
        parent_id: &str,
        page_token: Option<&'a str>,
    ) -> AppResult<Page<FolderHandle>> {
        let query = folders_query(parent_id);
        let list = self
            .list_files(
                session,
                &query,
                FOLDER_PAGE_SIZE,
                page_token,
                "nextPageToken, files(id, name)",
            )
            .await?;

        Ok(Page {
            items: list.files.into_iter().map(FolderHandle::from).collect(),
            next_page_token: list.next_page_token,
        })
    }

    async fn create_folder<'a>(
        &self,
        session: &Session,
        name: &str,
        parent_id: Option<&'a str>,
    ) -> AppResult<FolderHandle> {
        let url = format!("{}/files", self.drive_api_url);
        let mut metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME,
        });
        if let Some(parent) = parent_id {
            metadata["parents"] = json!([parent]);
        }

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(session.bearer())
            .query(&[("fields", "id, name")])
            .json(&metadata)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::write_error("files.create folder", response).await);
        }

        let file: DriveFile = response.json().await?;
        tracing::info!(folder = %file.name, "Folder created");

        Ok(file.into())
    }

    async fn create_document<'a>(
        &self,
        session: &Session,
        name: &str,
        folder_id: &str,
        initial_text: Option<&'a str>,
    ) -> AppResult<DocumentHandle> {
        let url = format!("{}/files", self.drive_api_url);
        let metadata = json!({
            "name": name,
            "mimeType": GOOGLE_DOC_MIME,
            "parents": [folder_id],
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(session.bearer())
            .query(&[("fields", "id, name, mimeType")])
            .json(&metadata)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::write_error("files.create document", response).await);
        }

        let file: DriveFile = response.json().await?;
        let handle = DocumentHandle::from(file);

        if let Some(text) = initial_text.filter(|t| !t.is_empty()) {
            self.docs_batch_update(
                session,
                &handle.id,
                json!([{
                    "insertText": {
                        "location": { "index": 1 },
                        "text": text,
                    }
                }]),
            )
            .await?;
        }

        tracing::info!(document = %handle.name, "Document created");

        Ok(handle)
    }

    async fn list_documents<'a>(
        &self,
        session: &Session,
        folder_id: &str,
        page_token: Option<&'a str>,
    ) -> AppResult<Page<DocumentHandle>> {
        let query = documents_query(folder_id);
        let list = self
            .list_files(
                session,
                &query,
                DOCUMENT_PAGE_SIZE,
                page_token,
                "nextPageToken, files(id, name, mimeType)",
            )
            .await?;

        Ok(Page {
            items: list.files.into_iter().map(DocumentHandle::from).collect(),
            next_page_token: list.next_page_token,
        })
    }

    async fn read_text(&self, session: &Session, handle: &DocumentHandle) -> AppResult<String> {
        let request = if handle.mime_type == GOOGLE_DOC_MIME {
            let url = format!("{}/files/{}/export", self.drive_api_url, handle.id);
            self.http_client
                .get(&url)
                .bearer_auth(session.bearer())
                .query(&[("mimeType", PLAIN_TEXT_MIME)])
        } else {
            let url = format!("{}/files/{}", self.drive_api_url, handle.id);
            self.http_client
                .get(&url)
                .bearer_auth(session.bearer())
                .query(&[("alt", "media")])
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(Self::read_error("files content read", response).await);
        }

        Ok(response.text().await?)
    }

    async fn replace_exact_text(
        &self,
        session: &Session,
        handle: &DocumentHandle,
        old_text: &str,
        new_text: &str,
    ) -> AppResult<()> {
        let response = self
            .docs_batch_update(
                session,
                &handle.id,
                json!([{
                    "replaceAllText": {
                        "containsText": {
                            "text": old_text,
                            "matchCase": true,
                        },
                        "replaceText": new_text,
                    }
                }]),
            )
            .await?;

        let occurrences = response
            .replies
            .first()
            .and_then(|r| r.replace_all_text.as_ref())
            .and_then(|r| r.occurrences_changed)
            .unwrap_or(0);

        if occurrences == 0 {
            return Err(AppError::RemoteNotFound(format!(
                "text not present in document: {}",
                old_text
            )));
        }

        tracing::info!(
            document = %handle.name,
            occurrences = occurrences,
            "Exact text replaced"
        );

        Ok(())
    }

    async fn append_text(
        &self,
        session: &Session,
        handle: &DocumentHandle,
        text: &str,
    ) -> AppResult<()> {
        let line = format!("\n{}", text);

        if handle.mime_type == GOOGLE_DOC_MIME {
            self.docs_batch_update(
                session,
                &handle.id,
                json!([{
                    "insertText": {
                        "endOfSegmentLocation": { "segmentId": "" },
                        "text": line,
                    }
                }]),
            )
            .await?;
        } else {
            let mut content = self.read_text(session, handle).await?;
            content.push_str(&line);
            self.upload_content(session, &handle.id, &content).await?;
        }

        tracing::info!(document = %handle.name, "Line appended");

        Ok(())
    }

    async fn write_text(
        &self,
        session: &Session,
        handle: &DocumentHandle,
        content: &str,
    ) -> AppResult<()> {
        self.upload_content(session, &handle.id, content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_by_name_query_escapes_quotes() {
        let query = document_by_name_query("minha 'lista'", "folder-1");
        assert!(query.contains(r"name = 'minha \'lista\''"));
        assert!(query.contains("'folder-1' in parents"));
        assert!(query.contains("trashed = false"));
    }

    #[test]
    fn test_folders_query_shape() {
        let query = folders_query("root");
        assert_eq!(
            query,
            "'root' in parents and mimeType = 'application/vnd.google-apps.folder' and trashed = false"
        );
    }

    #[test]
    fn test_documents_query_covers_both_mimes() {
        let query = documents_query("folder-9");
        assert!(query.contains(GOOGLE_DOC_MIME));
        assert!(query.contains(PLAIN_TEXT_MIME));
        assert!(query.starts_with("'folder-9' in parents"));
    }

    #[test]
    fn test_batch_update_reply_deserialization() {
        let json = r#"{
            "replies": [{"replaceAllText": {"occurrencesChanged": 1}}]
        }"#;
        let response: BatchUpdateResponse = serde_json::from_str(json).unwrap();

        let occurrences = response.replies[0]
            .replace_all_text
            .as_ref()
            .unwrap()
            .occurrences_changed;
        assert_eq!(occurrences, Some(1));
    }

    #[test]
    fn test_batch_update_reply_zero_occurrences_shape() {
        // The Docs API omits occurrencesChanged entirely when nothing matched
        let json = r#"{"replies": [{"replaceAllText": {}}]}"#;
        let response: BatchUpdateResponse = serde_json::from_str(json).unwrap();

        let occurrences = response.replies[0]
            .replace_all_text
            .as_ref()
            .unwrap()
            .occurrences_changed;
        assert_eq!(occurrences, None);
    }

    #[test]
    fn test_drive_file_list_deserialization() {
        let json = r#"{
            "nextPageToken": "abc",
            "files": [
                {"id": "f1", "name": "lista", "mimeType": "text/plain"}
            ]
        }"#;
        let list: DriveFileList = serde_json::from_str(json).unwrap();

        assert_eq!(list.next_page_token.as_deref(), Some("abc"));
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.files[0].mime_type, "text/plain");
    }
}
