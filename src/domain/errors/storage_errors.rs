use crate::domain::value_objects::ImageKey;

/// Errors that can occur while talking to the object store
#[derive(Debug, Clone)]
pub enum StorageError {
    /// No blob stored under the key
    ObjectNotFound { key: ImageKey },

    /// Access denied
    AccessDenied { key: ImageKey, operation: String },

    /// Operation not supported by the backend
    UnsupportedOperation { operation: String, reason: String },

    /// Validation error
    ValidationError { message: String },

    /// Infrastructure error with external source
    InfrastructureError {
        message: String,
        source: Option<String>, // Store error as string to allow Clone
    },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ObjectNotFound { key } => {
                write!(f, "Object not found: {}", key)
            }
            StorageError::AccessDenied { key, operation } => {
                write!(
                    f,
                    "Access denied for operation '{}' on object: {}",
                    operation, key
                )
            }
            StorageError::UnsupportedOperation { operation, reason } => {
                write!(f, "Unsupported operation '{}': {}", operation, reason)
            }
            StorageError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::InfrastructureError { message, .. } => {
                write!(f, "Infrastructure error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for object store operations
pub type StorageResult<T> = Result<T, StorageError>;
