use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An image chosen by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// Original file name as picked by the user
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Build an upload from a file name, guessing the content type from its extension
    pub fn from_file_name(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).map(str::to_string);
        Self::new(file_name, content_type, data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Content type for the common image extensions
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "heic" => Some("image/heic"),
        "avif" => Some("image/avif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// A time-limited URL for fetching a stored image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
