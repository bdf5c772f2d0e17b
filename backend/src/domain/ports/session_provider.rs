//! Driving port resolving a session's user id into a live identity.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Looks up the account behind a session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The user for `id`, or `None` when the account no longer exists.
    async fn current_user(&self, id: &UserId) -> Result<Option<User>, Error>;
}
