//! In-memory adapters for the driven ports.
//!
//! State lives behind `tokio::sync::RwLock`s, so every adapter is
//! `Send + Sync` and can be shared through `Arc`. Contents vanish with the
//! process.

mod catalog_store;
mod loan_repository;
mod user_repository;

pub use catalog_store::InMemoryCatalogStore;
pub use loan_repository::InMemoryLoanRepository;
pub use user_repository::InMemoryUserRepository;
