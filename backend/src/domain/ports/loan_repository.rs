//! Driven port for loan history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BookId, Loan, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by loan repository adapters.
    pub enum LoanRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "loan repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "loan repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Record a new open loan.
    async fn open(&self, loan: &Loan) -> Result<(), LoanRepositoryError>;

    /// Close the open loan of `holder` on `book_id`.
    ///
    /// Returns `false` when no open loan matched.
    async fn close(
        &self,
        book_id: &BookId,
        holder: &Username,
        returned_at: DateTime<Utc>,
    ) -> Result<bool, LoanRepositoryError>;

    /// Loans for one book, oldest first.
    async fn list_for_book(&self, book_id: &BookId) -> Result<Vec<Loan>, LoanRepositoryError>;
}
