pub mod ingest;
pub mod store;

pub use ingest::{PreviewRef, PreviewRegistry, ingest_batch, ingest_bytes, ingest_file};
pub use store::CaseStore;

use chrono::{DateTime, Local};
use std::fmt;
use std::sync::Arc;

/// Coarse classification of an attachment, derived once from its MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Audio,
    Pdf,
    Video,
    Other,
}

impl FileCategory {
    /// Classifies a MIME type. Total: anything unrecognized is `Other`.
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.starts_with("audio/") {
            Self::Audio
        } else if mime_type == "application/pdf" {
            Self::Pdf
        } else if mime_type.starts_with("video/") {
            Self::Video
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Pdf => "pdf",
            Self::Video => "video",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier of a case, assigned at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseId(String);

impl CaseId {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An attachment that has been fully read and encoded
#[derive(Debug, Clone)]
pub struct CaseFile {
    pub name: String,
    pub category: FileCategory,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Local preview handle; never sent to the model
    pub preview: PreviewRef,
    /// Base64 payload sent to the model
    pub encoded_content: String,
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Model,
}

/// One turn of dialogue inside a case
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
}

impl ChatMessage {
    fn now_timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Self::now_timestamp(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            content: content.into(),
            timestamp: Self::now_timestamp(),
        }
    }
}

/// A unit of work: attached documents plus the conversation about them.
///
/// The file and message sequences are shared snapshots. The store replaces
/// them wholesale on every mutation, so a snapshot handed to a worker
/// thread never changes underneath it.
#[derive(Debug, Clone)]
pub struct Case {
    id: CaseId,
    name: String,
    files: Arc<Vec<CaseFile>>,
    messages: Arc<Vec<ChatMessage>>,
    created_at: DateTime<Local>,
}

impl Case {
    #[must_use]
    pub fn id(&self) -> &CaseId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn files(&self) -> &[CaseFile] {
        &self.files
    }

    /// Cheap snapshot of the file sequence
    #[must_use]
    pub fn files_snapshot(&self) -> Arc<Vec<CaseFile>> {
        Arc::clone(&self.files)
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_mime() {
        assert_eq!(FileCategory::from_mime("image/png"), FileCategory::Image);
        assert_eq!(FileCategory::from_mime("application/pdf"), FileCategory::Pdf);
        assert_eq!(FileCategory::from_mime("text/plain"), FileCategory::Other);
        assert_eq!(FileCategory::from_mime("audio/webm"), FileCategory::Audio);
        assert_eq!(FileCategory::from_mime("video/mp4"), FileCategory::Video);
    }

    #[test]
    fn test_category_pdf_requires_exact_match() {
        assert_eq!(
            FileCategory::from_mime("application/pdf+zip"),
            FileCategory::Other
        );
        assert_eq!(FileCategory::from_mime(""), FileCategory::Other);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(FileCategory::Image.to_string(), "image");
        assert_eq!(FileCategory::Other.label(), "other");
    }

    #[test]
    fn test_chat_message_constructors() {
        let user = ChatMessage::user("hello");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "hello");

        let model = ChatMessage::model("");
        assert_eq!(model.role, MessageRole::Model);
        assert!(model.content.is_empty());
    }
}
