use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    domain::{errors::IdentityError, value_objects::Username},
    ports::identity::{Caller, IdentityProvider},
};

/// Identity provider for a caller authenticated out of band, e.g. by the
/// environment the binary runs in.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    caller: Caller,
    signed_out: AtomicBool,
}

impl StaticIdentityProvider {
    pub fn new(username: Username) -> Self {
        Self {
            caller: Caller::new(username),
            signed_out: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    fn current_caller(&self) -> Result<Caller, IdentityError> {
        if self.signed_out.load(Ordering::Acquire) {
            return Err(IdentityError::NotSignedIn);
        }
        Ok(self.caller.clone())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.signed_out.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_out_ends_session() {
        let provider = StaticIdentityProvider::new(Username::new("alice".to_string()).unwrap());

        let caller = provider.current_caller().unwrap();
        assert_eq!(caller.username.as_str(), "alice");
        assert_eq!(caller.display_name(), "Alice");

        provider.sign_out().await.unwrap();
        assert!(matches!(
            provider.current_caller(),
            Err(IdentityError::NotSignedIn)
        ));
    }
}
