//! Driving port for reading the catalogue.

use async_trait::async_trait;

use crate::domain::{Book, BookId, LifecycleError};

/// Read-side use-cases. Anyone may browse, signed in or not.
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// List books, filtered by a case-insensitive title/author query when
    /// one is given. Blank queries list everything.
    async fn search(&self, query: Option<&str>) -> Result<Vec<Book>, LifecycleError>;

    /// Fetch one book or fail with [`LifecycleError::NotFound`].
    async fn get(&self, id: &BookId) -> Result<Book, LifecycleError>;
}
