//! Account domain service.
//!
//! Implements login, registration and session lookup over a
//! [`UserRepository`] and a [`PasswordHasher`]. Password hashing is CPU
//! bound, so it runs on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, RegistrationService, SessionProvider,
    UserPersistenceError, UserRecord, UserRepository,
};
use crate::domain::{Error, LoginCredentials, Registration, Role, User, UserId, Username};

/// Message returned for every failed login so callers cannot probe which
/// usernames exist.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing the login, registration and session ports.
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> Clone for AccountService<U, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<U, H> AccountService<U, H> {
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} is already taken"))
                .with_details(serde_json::json!({ "field": "username" }))
        }
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

impl<U, H> AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn hash_password(&self, password: &str) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify_password(&self, password: &str, stored_hash: String) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|err| Error::internal(format!("verification task failed: {err}")))
    }

    async fn insert(&self, username: Username, role: Role, password: &str) -> Result<User, Error> {
        let password_hash = self.hash_password(password).await?;
        let user = User::new(UserId::random(), username, role);
        let record = UserRecord {
            user: user.clone(),
            password_hash,
        };
        self.users
            .insert(&record)
            .await
            .map_err(map_persistence_error)?;
        Ok(user)
    }

    /// Make sure an admin account named `username` exists.
    ///
    /// Creates it with `password` when missing. An existing account is left
    /// untouched, although a warning is logged if it is not an admin.
    pub async fn ensure_admin(&self, username: &Username, password: &str) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_username(username)
            .await
            .map_err(map_persistence_error)?;
        if let Some(record) = existing {
            if record.user.role() != Role::Admin {
                warn!(username = %username, "bootstrap admin name belongs to a member account");
            }
            return Ok(record.user);
        }
        let user = self.insert(username.clone(), Role::Admin, password).await?;
        info!(username = %username, user_id = %user.id(), "bootstrap admin created");
        Ok(user)
    }
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let record = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_persistence_error)?;
        let Some(record) = record else {
            debug!(username = %username, "login for unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let UserRecord {
            user,
            password_hash,
        } = record;
        if self
            .verify_password(credentials.password(), password_hash)
            .await?
        {
            Ok(user)
        } else {
            debug!(username = %username, "login with wrong password");
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl<U, H> RegistrationService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let user = self
            .insert(
                registration.username().clone(),
                Role::User,
                registration.password(),
            )
            .await?;
        info!(username = %user.username(), user_id = %user.id(), "account registered");
        Ok(user)
    }
}

#[async_trait]
impl<U, H> SessionProvider for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn current_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository};
    use rstest::rstest;

    fn name(raw: &str) -> Username {
        Username::new(raw).expect("fixture username")
    }

    fn record(username: &str, role: Role) -> UserRecord {
        UserRecord {
            user: User::new(UserId::random(), name(username), role),
            password_hash: "stored-hash".to_owned(),
        }
    }

    fn make_service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
    ) -> AccountService<MockUserRepository, MockPasswordHasher> {
        AccountService::new(Arc::new(users), Arc::new(hasher))
    }

    fn credentials(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("fixture credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_returns_user_on_matching_password() {
        let mut users = MockUserRepository::new();
        let stored = record("alice", Role::User);
        let expected = stored.user.clone();
        users
            .expect_find_by_username()
            .withf(|username| *username == name("alice"))
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|password, hash| password == "s3cret" && hash == "stored-hash")
            .times(1)
            .return_const(true);
        let service = make_service(users, hasher);

        let user = service
            .authenticate(&credentials("alice", "s3cret"))
            .await
            .expect("login succeeds");

        assert_eq!(user, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let mut users = MockUserRepository::new();
        let stored = record("alice", Role::User);
        users
            .expect_find_by_username()
            .times(2)
            .returning(move |username| {
                if *username == name("alice") {
                    Ok(Some(stored.clone()))
                } else {
                    Ok(None)
                }
            });
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().times(1).return_const(false);
        let service = make_service(users, hasher);

        let wrong = service
            .authenticate(&credentials("alice", "nope"))
            .await
            .expect_err("wrong password");
        let unknown = service
            .authenticate(&credentials("mallory", "nope"))
            .await
            .expect_err("unknown user");

        assert_eq!(wrong.code(), ErrorCode::Unauthorized);
        assert_eq!(wrong.message(), unknown.message());
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_usernames_fail_without_a_lookup() {
        let service = make_service(MockUserRepository::new(), MockPasswordHasher::new());

        let error = service
            .authenticate(&credentials("no spaces allowed", "pw"))
            .await
            .expect_err("malformed");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn register_stores_a_hashed_member() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|password| password == "hunter2")
            .times(1)
            .returning(|_| Ok("argon-hash".to_owned()));
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|record| {
                record.password_hash == "argon-hash"
                    && record.user.role() == Role::User
                    && *record.user.username() == name("bob")
            })
            .times(1)
            .return_once(|_| Ok(()));
        let service = make_service(users, hasher);
        let registration = Registration::try_from_parts("bob", "hunter2").expect("valid");

        let user = service.register(&registration).await.expect("registered");

        assert_eq!(user.role(), Role::User);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .times(1)
            .returning(|_| Ok("argon-hash".to_owned()));
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .times(1)
            .return_once(|_| Err(UserPersistenceError::duplicate_username("bob")));
        let service = make_service(users, hasher);
        let registration = Registration::try_from_parts("bob", "hunter2").expect("valid");

        let error = service
            .register(&registration)
            .await
            .expect_err("taken");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn hashing_failures_are_internal() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .times(1)
            .returning(|_| Err(PasswordHashError::hashing("bad params")));
        let service = make_service(MockUserRepository::new(), hasher);
        let registration = Registration::try_from_parts("bob", "hunter2").expect("valid");

        let error = service
            .register(&registration)
            .await
            .expect_err("hash failure");

        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_admin_keeps_existing_accounts() {
        let mut users = MockUserRepository::new();
        let stored = record("admin", Role::Admin);
        let expected = stored.user.clone();
        users
            .expect_find_by_username()
            .times(1)
            .return_once(move |_| Ok(Some(stored)));
        users.expect_insert().never();
        let service = make_service(users, MockPasswordHasher::new());

        let user = service
            .ensure_admin(&name("admin"), "pw")
            .await
            .expect("existing admin");

        assert_eq!(user, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_admin_creates_a_missing_admin() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .times(1)
            .return_once(|_| Ok(None));
        users
            .expect_insert()
            .withf(|record| record.user.role() == Role::Admin)
            .times(1)
            .return_once(|_| Ok(()));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .times(1)
            .returning(|_| Ok("argon-hash".to_owned()));
        let service = make_service(users, hasher);

        let user = service
            .ensure_admin(&name("admin"), "pw")
            .await
            .expect("admin created");

        assert_eq!(user.role(), Role::Admin);
    }

    #[rstest]
    #[tokio::test]
    async fn session_lookup_maps_connection_failures() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Err(UserPersistenceError::connection("refused")));
        let service = make_service(users, MockPasswordHasher::new());

        let error = service
            .current_user(&UserId::random())
            .await
            .expect_err("store down");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
