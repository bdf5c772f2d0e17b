//! Driving port for account sign-up.

use async_trait::async_trait;

use crate::domain::{Error, Registration, User};

#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create a member account. A taken username fails with `conflict`.
    async fn register(&self, registration: &Registration) -> Result<User, Error>;
}
