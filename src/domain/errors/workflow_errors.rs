use crate::domain::{
    errors::{RecordStoreError, StorageError, ValidationError},
    value_objects::ItemId,
};

/// Errors raised by the identity collaborator
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    #[error("No authenticated caller")]
    NotSignedIn,
}

/// Errors that abort an item workflow operation.
///
/// Every variant leaves the controller's local state at its last known-good
/// value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkflowError {
    #[error("Image upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("Image URL resolution failed: {0}")]
    UrlResolution(#[source] StorageError),

    #[error("Record store call failed: {0}")]
    RecordStore(#[from] RecordStoreError),

    #[error("Identity unavailable: {0}")]
    Identity(#[from] IdentityError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("No edit in progress")]
    NoEditInProgress,

    #[error("Item {id} is not being edited")]
    NotEditing { id: ItemId },

    #[error("Item {id} is not in the local list")]
    UnknownItem { id: ItemId },
}

impl WorkflowError {
    /// Whether the failure came from a remote collaborator call
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            WorkflowError::Upload(_)
                | WorkflowError::UrlResolution(_)
                | WorkflowError::RecordStore(_)
        )
    }
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
