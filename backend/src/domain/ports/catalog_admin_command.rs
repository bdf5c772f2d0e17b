//! Driving port for administrative catalogue maintenance.

use async_trait::async_trait;

use crate::domain::{Book, BookDraft, BookEdit, BookId, LifecycleError, Loan, Requester};

/// Admin-only operations. Non-admins get [`LifecycleError::Forbidden`],
/// anonymous callers [`LifecycleError::Unauthenticated`].
#[async_trait]
pub trait CatalogAdminCommand: Send + Sync {
    /// Add a book. It always starts available.
    async fn create(
        &self,
        requester: Option<&Requester>,
        draft: BookDraft,
    ) -> Result<Book, LifecycleError>;

    /// Edit descriptive fields. The status is left alone.
    async fn update(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
        edit: BookEdit,
    ) -> Result<Book, LifecycleError>;

    /// Delete a book in any status.
    async fn delete(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
    ) -> Result<(), LifecycleError>;

    /// Clear a stuck reservation or loan.
    async fn force_available(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
    ) -> Result<Book, LifecycleError>;

    /// Loan history for one book.
    async fn loan_history(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
    ) -> Result<Vec<Loan>, LifecycleError>;
}
