//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (`CatalogStore`, `UserRepository`, `LoanRepository`,
//! `PasswordHasher`) describe what the domain needs from adapters. Driving
//! ports (`CatalogQuery`, `BookLifecycleCommand`, `CatalogAdminCommand`,
//! `LoginService`, `RegistrationService`, `SessionProvider`) are the
//! use-cases inbound adapters call. Driven port errors are strongly typed
//! so adapters map their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod book_lifecycle_command;
mod catalog_admin_command;
mod catalog_query;
mod catalog_store;
mod loan_repository;
mod login_service;
mod password_hasher;
mod registration_service;
mod session_provider;
mod user_repository;

pub use book_lifecycle_command::BookLifecycleCommand;
pub use catalog_admin_command::CatalogAdminCommand;
pub use catalog_query::CatalogQuery;
#[cfg(test)]
pub use catalog_store::MockCatalogStore;
pub use catalog_store::{CatalogStore, CatalogStoreError};
#[cfg(test)]
pub use loan_repository::MockLoanRepository;
pub use loan_repository::{LoanRepository, LoanRepositoryError};
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use registration_service::RegistrationService;
pub use session_provider::SessionProvider;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRecord, UserRepository};
