//! Loan history records.

use chrono::{DateTime, Utc};

use crate::domain::{BookId, Username};

/// One borrowing of a book, opened when the book enters `Borrowed` and closed
/// when it leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub book_id: BookId,
    pub holder: Username,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    /// Start an open loan.
    #[must_use]
    pub fn open(book_id: BookId, holder: Username, borrowed_at: DateTime<Utc>) -> Self {
        Self {
            book_id,
            holder,
            borrowed_at,
            returned_at: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}
