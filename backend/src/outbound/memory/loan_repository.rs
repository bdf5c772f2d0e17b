//! In-memory loan history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{LoanRepository, LoanRepositoryError};
use crate::domain::{BookId, Loan, Username};

#[derive(Debug, Default)]
pub struct InMemoryLoanRepository {
    loans: RwLock<Vec<Loan>>,
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanRepository for InMemoryLoanRepository {
    async fn open(&self, loan: &Loan) -> Result<(), LoanRepositoryError> {
        self.loans.write().await.push(loan.clone());
        Ok(())
    }

    async fn close(
        &self,
        book_id: &BookId,
        holder: &Username,
        returned_at: DateTime<Utc>,
    ) -> Result<bool, LoanRepositoryError> {
        let mut loans = self.loans.write().await;
        let open = loans
            .iter_mut()
            .rev()
            .find(|loan| loan.book_id == *book_id && loan.holder == *holder && loan.is_open());
        Ok(open
            .map(|loan| loan.returned_at = Some(returned_at))
            .is_some())
    }

    async fn list_for_book(&self, book_id: &BookId) -> Result<Vec<Loan>, LoanRepositoryError> {
        let loans = self.loans.read().await;
        Ok(loans
            .iter()
            .filter(|loan| loan.book_id == *book_id)
            .cloned()
            .collect())
    }
}
