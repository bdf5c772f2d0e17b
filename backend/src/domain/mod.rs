//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed catalogue model and the rules that
//! govern it. Nothing here knows about HTTP or storage; adapters reach the
//! domain through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Book, BookStatus, BookId: catalogue records and their lifecycle state.
//! - LifecyclePolicy, BookAction, LifecycleError: the reserve / borrow /
//!   return authority.
//! - User, Username, Role, Requester: identities and who is asking.
//! - CatalogService, AccountService: port implementations wired by the
//!   server.

pub mod account_service;
pub mod auth;
pub mod book;
pub mod catalog_service;
pub mod error;
pub mod lifecycle;
pub mod loan;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountService, INVALID_CREDENTIALS};
pub use self::auth::{
    LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration,
    RegistrationValidationError,
};
pub use self::book::{
    Book, BookDetails, BookDraft, BookEdit, BookId, BookStatus, BookStatusKind,
    BookValidationError, CoverImage,
};
pub use self::catalog_service::{CatalogService, DEFAULT_STORE_TIMEOUT};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::lifecycle::{
    BookAction, LifecycleError, LifecyclePolicy, require_admin, require_requester,
};
pub use self::loan::Loan;
pub use self::trace_id::TraceId;
pub use self::user::{
    Requester, Role, USERNAME_MAX, USERNAME_MIN, User, UserId, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use biblioteka::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
