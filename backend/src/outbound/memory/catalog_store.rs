//! In-memory catalogue store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{CatalogStore, CatalogStoreError};
use crate::domain::{Book, BookDraft, BookEdit, BookId, BookStatus};

/// Catalogue store keeping books in insertion order.
///
/// `set_status` compares and writes under a single write lock, which makes
/// it the only place two racing transitions are arbitrated.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    books: RwLock<Vec<Book>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_mut<'a>(
    books: &'a mut [Book],
    id: &BookId,
) -> Result<&'a mut Book, CatalogStoreError> {
    books
        .iter_mut()
        .find(|book| book.id() == *id)
        .ok_or_else(|| CatalogStoreError::missing(*id))
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list(&self) -> Result<Vec<Book>, CatalogStoreError> {
        Ok(self.books.read().await.clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<Book>, CatalogStoreError> {
        let books = self.books.read().await;
        Ok(books
            .iter()
            .filter(|book| book.matches_query(query))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &BookId) -> Result<Option<Book>, CatalogStoreError> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.id() == *id).cloned())
    }

    async fn create(&self, draft: &BookDraft) -> Result<Book, CatalogStoreError> {
        let book = Book::create(BookId::random(), draft.clone());
        self.books.write().await.push(book.clone());
        debug!(book_id = %book.id(), "stored new book");
        Ok(book)
    }

    async fn update(&self, id: &BookId, edit: &BookEdit) -> Result<Book, CatalogStoreError> {
        let mut books = self.books.write().await;
        let book = find_mut(&mut books, id)?;
        book.apply_edit(edit.clone());
        debug!(book_id = %id, "updated book details");
        Ok(book.clone())
    }

    async fn delete(&self, id: &BookId) -> Result<(), CatalogStoreError> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|book| book.id() != *id);
        if books.len() == before {
            return Err(CatalogStoreError::missing(*id));
        }
        debug!(book_id = %id, "removed book");
        Ok(())
    }

    async fn set_status(
        &self,
        id: &BookId,
        expected: &BookStatus,
        next: &BookStatus,
    ) -> Result<Book, CatalogStoreError> {
        let mut books = self.books.write().await;
        let book = find_mut(&mut books, id)?;
        if book.status() != expected {
            return Err(CatalogStoreError::status_mismatch(
                *id,
                book.status().kind(),
            ));
        }
        book.set_status(next.clone());
        debug!(book_id = %id, from = %expected, to = %next, "status swapped");
        Ok(book.clone())
    }
}
