use serde::{Deserialize, Serialize};

/// Mime type of rich documents that support structured text replacement
pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
/// Mime type of plain-text documents, updated by full-content upload
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// A named document in the remote store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentHandle {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// A folder in the remote store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderHandle {
    pub id: String,
    pub name: String,
}

/// One page of a folder or document listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// How line changes are committed to a bound document. Decided once at
/// bind time from the document's mime type, not by error sniffing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommitStrategy {
    /// The backend replaces exact text in place (rich documents)
    StructuredReplace,
    /// Read the full content, patch the line, upload everything back
    ReadModifyWrite,
}

impl CommitStrategy {
    pub fn for_mime(mime_type: &str) -> Self {
        if mime_type == GOOGLE_DOC_MIME {
            CommitStrategy::StructuredReplace
        } else {
            CommitStrategy::ReadModifyWrite
        }
    }
}

/// The four pointers persisted across sessions. Saved together on every
/// successful bind, cleared together on logout or unrecoverable read
/// failure; everything else is rebuilt from a fresh remote read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionPointers {
    pub folder_id: Option<String>,
    pub file_id: Option<String>,
    pub file_name: Option<String>,
    pub file_mime: Option<String>,
}

impl SessionPointers {
    /// The bound document, when all three file pointers are present
    pub fn document(&self) -> Option<DocumentHandle> {
        Some(DocumentHandle {
            id: self.file_id.clone()?,
            name: self.file_name.clone()?,
            mime_type: self.file_mime.clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_strategy_by_mime() {
        assert_eq!(
            CommitStrategy::for_mime(GOOGLE_DOC_MIME),
            CommitStrategy::StructuredReplace
        );
        assert_eq!(
            CommitStrategy::for_mime(PLAIN_TEXT_MIME),
            CommitStrategy::ReadModifyWrite
        );
        assert_eq!(
            CommitStrategy::for_mime("application/octet-stream"),
            CommitStrategy::ReadModifyWrite
        );
    }

    #[test]
    fn test_pointers_document_requires_all_file_fields() {
        let mut pointers = SessionPointers {
            folder_id: Some("folder-1".to_string()),
            file_id: Some("file-1".to_string()),
            file_name: Some("lista".to_string()),
            file_mime: None,
        };
        assert!(pointers.document().is_none());

        pointers.file_mime = Some(PLAIN_TEXT_MIME.to_string());
        let handle = pointers.document().unwrap();
        assert_eq!(handle.id, "file-1");
        assert_eq!(handle.mime_type, PLAIN_TEXT_MIME);
    }
}
