use crate::domain::value_objects::{ItemId, Username};

/// Errors reported by the record store
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecordStoreError {
    #[error("Bucket item {id} not found for owner {owner}")]
    ItemNotFound { id: ItemId, owner: Username },

    #[error("Record store rejected the request: {message}")]
    Rejected { message: String },

    #[error("Corrupt record {id}: {message}")]
    CorruptRecord { id: String, message: String },

    #[error("Record store unavailable: {message}")]
    Unavailable {
        message: String,
        detail: Option<String>,
    },
}

/// Result type for record store operations
pub type RecordResult<T> = Result<T, RecordStoreError>;
