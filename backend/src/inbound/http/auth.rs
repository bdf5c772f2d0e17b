//! Account handlers: sign-up, login, logout and the current identity.
//!
//! ```text
//! POST /api/v1/auth/register {"username":"carol","password":"s3cret"}
//! POST /api/v1/auth/login    {"username":"carol","password":"s3cret"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, LoginCredentials, Registration, Role, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    map_login_validation_error, map_registration_validation_error,
};

/// Credentials body shared by register and login.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[schema(example = "carol")]
    pub username: String,
    #[schema(example = "s3cret")]
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "carol")]
    pub username: String,
    #[schema(example = "user")]
    pub role: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            role: user.role().as_str().to_owned(),
        }
    }
}

/// Create a member account. Does not sign the caller in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid username or password", body = ErrorSchema),
        (status = 409, description = "Username already taken", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let registration = Registration::try_from_parts(&username, &password)
        .map_err(map_registration_validation_error)?;
    let user = state.registration.register(&registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Check credentials and start a cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.renew();
    session.persist_user(user.id())?;
    info!(username = %user.username(), admin = user.role() == Role::Admin, "user logged in");
    Ok(web::Json(UserResponse::from(&user)))
}

/// End the session. Succeeds even when nobody is signed in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let id = session.require_user_id()?;
    match state.sessions.current_user(&id).await? {
        Some(user) => Ok(web::Json(UserResponse::from(&user))),
        None => {
            session.clear();
            Err(Error::unauthorized("login required"))
        }
    }
}
