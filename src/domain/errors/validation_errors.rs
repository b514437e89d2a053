/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ImageKey validation errors
    EmptyImageKey,
    ImageKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidImageKeyCharacter(char),
    ImageKeyStartsWithSlash,
    ImageKeyContainsDoubleSlash,
    EmptyNamespace,
    EmptyFileName,

    // Username validation errors
    EmptyUsername,
    InvalidUsernameCharacter(char),

    // Title validation errors
    BlankTitle,

    // ItemId validation errors
    InvalidItemId(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ImageKey errors
            ValidationError::EmptyImageKey => write!(f, "Image key cannot be empty"),
            ValidationError::ImageKeyTooLong { actual, max } => {
                write!(f, "Image key too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidImageKeyCharacter(c) => {
                write!(f, "Invalid character in image key: {:?}", c)
            }
            ValidationError::ImageKeyStartsWithSlash => {
                write!(f, "Image key cannot start with '/'")
            }
            ValidationError::ImageKeyContainsDoubleSlash => {
                write!(f, "Image key cannot contain '//'")
            }
            ValidationError::EmptyNamespace => write!(f, "Image namespace cannot be empty"),
            ValidationError::EmptyFileName => write!(f, "Image file name cannot be empty"),

            // Username errors
            ValidationError::EmptyUsername => write!(f, "Username cannot be empty"),
            ValidationError::InvalidUsernameCharacter(c) => {
                write!(f, "Invalid character in username: {:?}", c)
            }

            ValidationError::BlankTitle => write!(f, "Title cannot be blank"),

            ValidationError::InvalidItemId(value) => {
                write!(f, "Invalid item id: '{}'", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
