//! Book lifecycle authority.
//!
//! Owns the reserve / borrow / return state machine and who may drive it.
//! Everything here is pure: callers pass the current status and the
//! requester, and get back the next status or the reason it is refused.
//! The catalogue service applies the answer atomically against the store.
//!
//! ```text
//!               reserve                 borrow (holder)
//!   Available ----------> Reserved(u) -----------------> Borrowed(u)
//!       ^  \_____________________________________________/   |
//!       |                   borrow                           |
//!       +---------------- return (holder or admin) ----------+
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{BookId, BookStatus, BookStatusKind, Error, Requester};

/// A requester-driven lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookAction {
    Reserve,
    Borrow,
    Return,
}

impl BookAction {
    /// Every action, in the order clients should offer them.
    pub const ALL: [Self; 3] = [Self::Reserve, Self::Borrow, Self::Return];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reserve => "reserve",
            Self::Borrow => "borrow",
            Self::Return => "return",
        }
    }
}

impl fmt::Display for BookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a lifecycle or catalogue operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// No book with this id exists.
    #[error("book {0} not found")]
    NotFound(BookId),
    /// The operation needs a signed-in requester.
    #[error("login required")]
    Unauthenticated,
    /// The requester is known but lacks the right.
    #[error("{reason}")]
    Forbidden { reason: String },
    /// The book's current status does not permit the action.
    #[error("cannot {action} a book that is {status}")]
    InvalidState {
        action: BookAction,
        status: BookStatusKind,
    },
    /// The catalogue store failed or timed out; nothing is assumed changed.
    #[error("catalogue store unavailable: {message}")]
    Transport { message: String },
}

impl LifecycleError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<LifecycleError> for Error {
    fn from(value: LifecycleError) -> Self {
        let message = value.to_string();
        match value {
            LifecycleError::NotFound(id) => Self::not_found(message)
                .with_details(serde_json::json!({ "bookId": id.to_string() })),
            LifecycleError::Unauthenticated => Self::unauthorized(message),
            LifecycleError::Forbidden { .. } => Self::forbidden(message),
            LifecycleError::InvalidState { action, status } => Self::invalid_state(message)
                .with_details(serde_json::json!({ "action": action, "status": status })),
            LifecycleError::Transport { .. } => Self::service_unavailable(message)
                .with_details(serde_json::json!({ "retryable": true })),
        }
    }
}

/// Administrative overrides applied by the authority.
///
/// Both default to enabled, matching how the catalogue has always let staff
/// step in. Disabling them makes admins follow the ordinary member rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Admin may reserve a book that someone else holds.
    pub admin_reserve_override: bool,
    /// Admin may return a book on behalf of any holder.
    pub admin_return_override: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            admin_reserve_override: true,
            admin_return_override: true,
        }
    }
}

/// Resolve an optional requester, refusing anonymous callers.
pub fn require_requester(requester: Option<&Requester>) -> Result<&Requester, LifecycleError> {
    requester.ok_or(LifecycleError::Unauthenticated)
}

/// Resolve a requester that must hold the admin role.
pub fn require_admin(requester: Option<&Requester>) -> Result<&Requester, LifecycleError> {
    let requester = require_requester(requester)?;
    if requester.is_admin() {
        Ok(requester)
    } else {
        Err(LifecycleError::forbidden("admin role required"))
    }
}

impl LifecyclePolicy {
    /// Next status for `action`, or why it is refused.
    pub fn apply(
        &self,
        action: BookAction,
        current: &BookStatus,
        requester: Option<&Requester>,
    ) -> Result<BookStatus, LifecycleError> {
        match action {
            BookAction::Reserve => self.reserve(current, requester),
            BookAction::Borrow => self.borrow(current, requester),
            BookAction::Return => self.return_book(current, requester),
        }
    }

    /// Reserve for the requester.
    ///
    /// # Examples
    /// ```
    /// use biblioteka::domain::{BookStatus, LifecyclePolicy, Requester, Role, Username};
    ///
    /// let alice = Requester::new(Username::new("alice").expect("valid"), Role::User);
    /// let next = LifecyclePolicy::default()
    ///     .reserve(&BookStatus::Available, Some(&alice))
    ///     .expect("available books can be reserved");
    /// assert_eq!(next, BookStatus::Reserved(alice.username().clone()));
    /// ```
    pub fn reserve(
        &self,
        current: &BookStatus,
        requester: Option<&Requester>,
    ) -> Result<BookStatus, LifecycleError> {
        let requester = require_requester(requester)?;
        let admin_override = self.admin_reserve_override && requester.is_admin();
        match current {
            BookStatus::Available => Ok(BookStatus::Reserved(requester.username().clone())),
            _ if admin_override => Ok(BookStatus::Reserved(requester.username().clone())),
            held => Err(invalid(BookAction::Reserve, held)),
        }
    }

    /// Borrow for the requester. A reservation held by the requester turns
    /// into a loan.
    pub fn borrow(
        &self,
        current: &BookStatus,
        requester: Option<&Requester>,
    ) -> Result<BookStatus, LifecycleError> {
        let requester = require_requester(requester)?;
        match current {
            BookStatus::Available => Ok(BookStatus::Borrowed(requester.username().clone())),
            BookStatus::Reserved(holder) if holder == requester.username() => {
                Ok(BookStatus::Borrowed(holder.clone()))
            }
            other => Err(invalid(BookAction::Borrow, other)),
        }
    }

    /// Return the book to the shelf. Covers cancelling a reservation too.
    pub fn return_book(
        &self,
        current: &BookStatus,
        requester: Option<&Requester>,
    ) -> Result<BookStatus, LifecycleError> {
        let requester = require_requester(requester)?;
        let Some(holder) = current.holder() else {
            return Err(invalid(BookAction::Return, current));
        };
        if holder == requester.username() || (self.admin_return_override && requester.is_admin())
        {
            Ok(BookStatus::Available)
        } else {
            Err(LifecycleError::forbidden(format!(
                "{} may not return a book held by {holder}",
                requester.username()
            )))
        }
    }

    /// Actions that would succeed for this requester right now.
    ///
    /// Empty for anonymous callers.
    #[must_use]
    pub fn allowed_actions(
        &self,
        current: &BookStatus,
        requester: Option<&Requester>,
    ) -> Vec<BookAction> {
        BookAction::ALL
            .into_iter()
            .filter(|action| self.apply(*action, current, requester).is_ok())
            .collect()
    }
}

fn invalid(action: BookAction, current: &BookStatus) -> LifecycleError {
    LifecycleError::InvalidState {
        action,
        status: current.kind(),
    }
}
