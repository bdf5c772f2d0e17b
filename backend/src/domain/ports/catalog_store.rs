//! Driven port for the catalogue store and its errors.
//!
//! The store is the single source of truth for book records. Status changes
//! go exclusively through [`CatalogStore::set_status`], an atomic
//! compare-and-set, so two racing requesters can never both win.

use async_trait::async_trait;

use crate::domain::{Book, BookDraft, BookEdit, BookId, BookStatus, BookStatusKind};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue store adapters.
    pub enum CatalogStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "catalogue store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "catalogue store query failed: {message}",
        /// No record with the given id exists.
        Missing { id: BookId } => "book {id} does not exist",
        /// The record's status no longer matches the caller's expectation.
        StatusMismatch { id: BookId, actual: BookStatusKind } =>
            "book {id} changed concurrently and is now {actual}",
    }
}

/// Persistence boundary for book records.
///
/// Implementations keep a stable iteration order: `list` and `search` return
/// books in the order the store holds them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every book, in store order.
    async fn list(&self) -> Result<Vec<Book>, CatalogStoreError>;

    /// Books whose title or author contains `query`, case-insensitively.
    async fn search(&self, query: &str) -> Result<Vec<Book>, CatalogStoreError>;

    /// Fetch one book.
    async fn get(&self, id: &BookId) -> Result<Option<Book>, CatalogStoreError>;

    /// Insert a new available book and return it with its assigned id.
    async fn create(&self, draft: &BookDraft) -> Result<Book, CatalogStoreError>;

    /// Replace descriptive fields. Never touches the status.
    async fn update(&self, id: &BookId, edit: &BookEdit) -> Result<Book, CatalogStoreError>;

    /// Remove a book outright.
    async fn delete(&self, id: &BookId) -> Result<(), CatalogStoreError>;

    /// Atomically move a book from `expected` to `next`.
    ///
    /// Fails with [`CatalogStoreError::StatusMismatch`] and leaves the record
    /// untouched when the stored status differs from `expected`.
    async fn set_status(
        &self,
        id: &BookId,
        expected: &BookStatus,
        next: &BookStatus,
    ) -> Result<Book, CatalogStoreError>;
}
