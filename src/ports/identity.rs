use async_trait::async_trait;

use crate::domain::{errors::IdentityError, value_objects::Username};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: Username,
}

impl Caller {
    pub fn new(username: Username) -> Self {
        Self { username }
    }

    pub fn display_name(&self) -> String {
        self.username.display_name()
    }
}

/// Port for the external identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// The currently signed-in caller
    fn current_caller(&self) -> Result<Caller, IdentityError>;

    /// End the caller's session
    async fn sign_out(&self) -> Result<(), IdentityError>;
}
