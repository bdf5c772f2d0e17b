//! Test helpers for inbound HTTP components.
//!
//! Handler tests run against the real services over in-memory adapters, so
//! a request exercises the same lifecycle rules production does.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::test::TestRequest;
use serde_json::json;

use crate::domain::ports::RegistrationService;
use crate::domain::{AccountService, CatalogService, Registration, Username};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{
    InMemoryCatalogStore, InMemoryLoanRepository, InMemoryUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

pub const ADMIN: (&str, &str) = ("admin", "admin-pass");
pub const ALICE: (&str, &str) = ("alice", "alice-pass");
pub const BOB: (&str, &str) = ("bob", "bob-pass");

/// Session middleware with a throwaway key and a non-`Secure` cookie named
/// `session`.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Argon2 with the smallest costs the crate accepts.
pub fn cheap_hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::with_costs(1024, 1, 1).expect("cheap argon2 params")
}

/// HTTP state over empty in-memory stores with `admin`, `alice` and `bob`
/// registered.
pub async fn seeded_state() -> HttpState {
    let accounts = Arc::new(AccountService::new(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(cheap_hasher()),
    ));
    accounts
        .ensure_admin(&Username::new(ADMIN.0).expect("admin name"), ADMIN.1)
        .await
        .expect("seed admin");
    for (username, password) in [ALICE, BOB] {
        let registration = Registration::try_from_parts(username, password).expect("valid");
        accounts.register(&registration).await.expect("seed member");
    }
    let catalog = Arc::new(CatalogService::new(
        Arc::new(InMemoryCatalogStore::new()),
        Arc::new(InMemoryLoanRepository::new()),
        Arc::new(mockable::DefaultClock),
    ));
    HttpState::from_services(accounts, catalog)
}

pub fn login_request((username, password): (&str, &str)) -> TestRequest {
    TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": username, "password": password }))
}

/// The `session` cookie set on `res`.
pub fn session_cookie<B: MessageBody>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
