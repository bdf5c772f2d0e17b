//! Catalogue domain service.
//!
//! Implements the catalogue driving ports on top of a [`CatalogStore`] and a
//! [`LoanRepository`]. State changes follow one shape: read the book, ask the
//! [`LifecyclePolicy`] for the next status, then commit with the store's
//! compare-and-set. Losing a race surfaces as `InvalidState`; the record is
//! never silently overwritten.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BookLifecycleCommand, CatalogAdminCommand, CatalogQuery, CatalogStore, CatalogStoreError,
    LoanRepository,
};
use crate::domain::{
    Book, BookAction, BookDraft, BookEdit, BookId, BookStatus, LifecycleError, LifecyclePolicy,
    Loan, Requester, require_admin, require_requester,
};

/// Deadline applied to every store call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Catalogue service implementing the query, lifecycle and admin ports.
#[derive(Clone)]
pub struct CatalogService<S, L> {
    store: Arc<S>,
    loans: Arc<L>,
    clock: Arc<dyn Clock>,
    policy: LifecyclePolicy,
    store_timeout: Duration,
}

impl<S, L> CatalogService<S, L> {
    /// Create a service with the default policy and store deadline.
    pub fn new(store: Arc<S>, loans: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            loans,
            clock,
            policy: LifecyclePolicy::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Replace the lifecycle policy.
    #[must_use]
    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the per-call store deadline.
    #[must_use]
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }
}

impl<S, L> CatalogService<S, L>
where
    S: CatalogStore,
    L: LoanRepository,
{
    fn map_store_error(error: CatalogStoreError) -> LifecycleError {
        match error {
            CatalogStoreError::Missing { id } => LifecycleError::NotFound(id),
            other => LifecycleError::transport(other.to_string()),
        }
    }

    /// Run a store call under the deadline. Expiry means no outcome is
    /// known, so it is reported as a retryable transport failure.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, LifecycleError>
    where
        F: Future<Output = Result<T, LifecycleError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = u64::try_from(self.store_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(operation, timeout_ms, "catalogue store call exceeded its deadline");
                Err(LifecycleError::transport(format!(
                    "{operation} timed out after {timeout_ms}ms"
                )))
            }
        }
    }

    async fn fetch(&self, id: &BookId) -> Result<Book, LifecycleError> {
        self.bounded("get", async {
            self.store.get(id).await.map_err(Self::map_store_error)
        })
        .await?
        .ok_or(LifecycleError::NotFound(*id))
    }

    async fn compare_and_set(
        &self,
        action: BookAction,
        id: &BookId,
        expected: &BookStatus,
        next: &BookStatus,
    ) -> Result<Book, LifecycleError> {
        self.bounded("set_status", async {
            match self.store.set_status(id, expected, next).await {
                Ok(book) => Ok(book),
                Err(CatalogStoreError::StatusMismatch { id, actual }) => {
                    warn!(book_id = %id, %action, expected = %expected, %actual, "lost status race");
                    Err(LifecycleError::InvalidState {
                        action,
                        status: actual,
                    })
                }
                Err(other) => Err(Self::map_store_error(other)),
            }
        })
        .await
    }

    /// Keep loan history in step with a committed status change.
    ///
    /// The book record is authoritative; a failed history write is logged
    /// and does not undo the transition.
    async fn record_loans(&self, id: &BookId, previous: &BookStatus, next: &BookStatus) {
        if previous == next {
            return;
        }
        let now = self.clock.utc();
        if let BookStatus::Borrowed(holder) = previous {
            let closed = self
                .bounded("close_loan", async {
                    self.loans
                        .close(id, holder, now)
                        .await
                        .map_err(|err| LifecycleError::transport(err.to_string()))
                })
                .await;
            match closed {
                Ok(true) => debug!(book_id = %id, %holder, "loan closed"),
                Ok(false) => warn!(book_id = %id, %holder, "no open loan to close"),
                Err(error) => warn!(book_id = %id, %holder, %error, "failed to close loan"),
            }
        }
        if let BookStatus::Borrowed(holder) = next {
            let loan = Loan::open(*id, holder.clone(), now);
            let opened = self
                .bounded("open_loan", async {
                    self.loans
                        .open(&loan)
                        .await
                        .map_err(|err| LifecycleError::transport(err.to_string()))
                })
                .await;
            match opened {
                Ok(()) => debug!(book_id = %id, %holder, "loan opened"),
                Err(error) => warn!(book_id = %id, %holder, %error, "failed to open loan"),
            }
        }
    }

    async fn transition(
        &self,
        action: BookAction,
        id: &BookId,
        requester: Option<&Requester>,
    ) -> Result<Book, LifecycleError> {
        let requester = require_requester(requester)?;
        let book = self.fetch(id).await?;
        let current = book.status().clone();
        let next = self
            .policy
            .apply(action, &current, Some(requester))
            .inspect_err(|error| {
                debug!(book_id = %id, %action, requester = %requester.username(), %error, "transition refused");
            })?;
        let updated = self.compare_and_set(action, id, &current, &next).await?;
        self.record_loans(id, &current, &next).await;
        info!(
            book_id = %id,
            %action,
            requester = %requester.username(),
            from = %current,
            to = %next,
            "book status changed"
        );
        Ok(updated)
    }
}

#[async_trait]
impl<S, L> CatalogQuery for CatalogService<S, L>
where
    S: CatalogStore,
    L: LoanRepository,
{
    async fn search(&self, query: Option<&str>) -> Result<Vec<Book>, LifecycleError> {
        let query = query.map(str::trim).filter(|value| !value.is_empty());
        self.bounded("search", async {
            let books = match query {
                Some(needle) => self.store.search(needle).await,
                None => self.store.list().await,
            };
            books.map_err(Self::map_store_error)
        })
        .await
    }

    async fn get(&self, id: &BookId) -> Result<Book, LifecycleError> {
        self.fetch(id).await
    }
}

#[async_trait]
impl<S, L> BookLifecycleCommand for CatalogService<S, L>
where
    S: CatalogStore,
    L: LoanRepository,
{
    async fn reserve(
        &self,
        id: &BookId,
        requester: Option<&Requester>,
    ) -> Result<Book, LifecycleError> {
        self.transition(BookAction::Reserve, id, requester).await
    }

    async fn borrow(
        &self,
        id: &BookId,
        requester: Option<&Requester>,
    ) -> Result<Book, LifecycleError> {
        self.transition(BookAction::Borrow, id, requester).await
    }

    async fn return_book(
        &self,
        id: &BookId,
        requester: Option<&Requester>,
    ) -> Result<Book, LifecycleError> {
        self.transition(BookAction::Return, id, requester).await
    }

    fn allowed_actions(&self, book: &Book, requester: Option<&Requester>) -> Vec<BookAction> {
        self.policy.allowed_actions(book.status(), requester)
    }
}

#[async_trait]
impl<S, L> CatalogAdminCommand for CatalogService<S, L>
where
    S: CatalogStore,
    L: LoanRepository,
{
    async fn create(
        &self,
        requester: Option<&Requester>,
        draft: BookDraft,
    ) -> Result<Book, LifecycleError> {
        let admin = require_admin(requester)?;
        let book = self
            .bounded("create", async {
                self.store.create(&draft).await.map_err(Self::map_store_error)
            })
            .await?;
        info!(book_id = %book.id(), admin = %admin.username(), title = book.title(), "book created");
        Ok(book)
    }

    async fn update(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
        edit: BookEdit,
    ) -> Result<Book, LifecycleError> {
        let admin = require_admin(requester)?;
        let book = self
            .bounded("update", async {
                self.store.update(id, &edit).await.map_err(Self::map_store_error)
            })
            .await?;
        info!(book_id = %id, admin = %admin.username(), "book updated");
        Ok(book)
    }

    async fn delete(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
    ) -> Result<(), LifecycleError> {
        let admin = require_admin(requester)?;
        self.bounded("delete", async {
            self.store.delete(id).await.map_err(Self::map_store_error)
        })
        .await?;
        info!(book_id = %id, admin = %admin.username(), "book deleted");
        Ok(())
    }

    async fn force_available(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
    ) -> Result<Book, LifecycleError> {
        let admin = require_admin(requester)?;
        let book = self.fetch(id).await?;
        let current = book.status().clone();
        if current == BookStatus::Available {
            return Ok(book);
        }
        let updated = self
            .compare_and_set(BookAction::Return, id, &current, &BookStatus::Available)
            .await?;
        self.record_loans(id, &current, &BookStatus::Available).await;
        info!(
            book_id = %id,
            admin = %admin.username(),
            from = %current,
            "book released by admin"
        );
        Ok(updated)
    }

    async fn loan_history(
        &self,
        requester: Option<&Requester>,
        id: &BookId,
    ) -> Result<Vec<Loan>, LifecycleError> {
        require_admin(requester)?;
        self.fetch(id).await?;
        self.bounded("list_loans", async {
            self.loans
                .list_for_book(id)
                .await
                .map_err(|err| LifecycleError::transport(err.to_string()))
        })
        .await
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
