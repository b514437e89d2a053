use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{errors::ValidationError, value_objects::Username};

/// Namespace under which item images are uploaded unless configured otherwise
pub const DEFAULT_IMAGE_NAMESPACE: &str = "bucket-images";

const MAX_KEY_LEN: usize = 1024;

/// A validated key into the object store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageKey(String);

impl ImageKey {
    /// Create a new ImageKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyImageKey);
        }

        if value.len() > MAX_KEY_LEN {
            return Err(ValidationError::ImageKeyTooLong {
                actual: value.len(),
                max: MAX_KEY_LEN,
            });
        }

        if value.contains('\0') {
            return Err(ValidationError::InvalidImageKeyCharacter('\0'));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ImageKeyStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ImageKeyContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Build the key for a fresh upload: `<namespace>/<owner>/<epoch millis>-<file name>`.
    ///
    /// The millisecond timestamp keeps repeated uploads of the same file by the
    /// same owner apart. Only the last path component of `file_name` is used.
    pub fn for_upload(
        namespace: &str,
        owner: &Username,
        at: DateTime<Utc>,
        file_name: &str,
    ) -> Result<Self, ValidationError> {
        let namespace = namespace.trim_matches('/');
        if namespace.is_empty() {
            return Err(ValidationError::EmptyNamespace);
        }

        let base_name = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if base_name.is_empty() {
            return Err(ValidationError::EmptyFileName);
        }

        Self::new(format!(
            "{}/{}/{}-{}",
            namespace,
            owner,
            at.timestamp_millis(),
            base_name
        ))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the directory part of the key (everything before the last '/')
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// Get the file name part of the key (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    /// Check if this key has the given prefix
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl TryFrom<String> for ImageKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageKey> for String {
    fn from(key: ImageKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
