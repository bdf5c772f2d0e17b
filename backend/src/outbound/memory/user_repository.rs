//! In-memory user accounts.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRecord, UserRepository};
use crate::domain::{User, UserId, Username};

/// User repository keyed by username, which keeps names unique.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Username, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: &UserRecord) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        let username = record.user.username();
        if users.contains_key(username) {
            return Err(UserPersistenceError::duplicate_username(username.to_string()));
        }
        users.insert(username.clone(), record.clone());
        debug!(username = %username, user_id = %record.user.id(), "stored user");
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|record| record.user.id() == id)
            .map(|record| record.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserRecord>, UserPersistenceError> {
        Ok(self.users.read().await.get(username).cloned())
    }
}
