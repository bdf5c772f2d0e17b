//! Driving port for requester-initiated lifecycle actions.

use async_trait::async_trait;

use crate::domain::{Book, BookAction, BookId, LifecycleError, Requester};

/// Reserve, borrow and return on behalf of an explicit requester.
///
/// `None` stands for an anonymous caller and always yields
/// [`LifecycleError::Unauthenticated`].
#[async_trait]
pub trait BookLifecycleCommand: Send + Sync {
    async fn reserve(
        &self,
        id: &BookId,
        requester: Option<&Requester>,
    ) -> Result<Book, LifecycleError>;

    async fn borrow(
        &self,
        id: &BookId,
        requester: Option<&Requester>,
    ) -> Result<Book, LifecycleError>;

    async fn return_book(
        &self,
        id: &BookId,
        requester: Option<&Requester>,
    ) -> Result<Book, LifecycleError>;

    /// Actions the requester could take on `book` right now.
    fn allowed_actions(&self, book: &Book, requester: Option<&Requester>) -> Vec<BookAction>;
}
