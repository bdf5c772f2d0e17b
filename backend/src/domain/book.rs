//! Book records and their availability status.
//!
//! `BookStatus` makes the availability/holder pairing structural: a holder
//! exists exactly when the book is reserved or borrowed, so a record can never
//! claim to be available while naming a holder.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Username;

/// Validation errors raised while building book values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookValidationError {
    #[error("book id must be a valid UUID")]
    InvalidId,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("author must not be empty")]
    EmptyAuthor,
    #[error("status '{0}' is not one of available, reserved, borrowed")]
    UnknownStatus(String),
}

/// Opaque unique book identifier assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookId(Uuid);

impl BookId {
    /// Parse an identifier supplied by a caller.
    pub fn new(id: impl AsRef<str>) -> Result<Self, BookValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| BookValidationError::InvalidId)
    }

    /// Generate a fresh identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Availability of a book, carrying the holder for the held states.
///
/// # Examples
/// ```
/// use biblioteka::domain::{BookStatus, Username};
///
/// let alice = Username::new("alice").expect("valid");
/// let status = BookStatus::Reserved(alice.clone());
/// assert_eq!(status.holder(), Some(&alice));
/// assert_eq!(BookStatus::Available.holder(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum BookStatus {
    /// On the shelf, nobody holds it.
    #[default]
    Available,
    /// Set aside for the holder.
    Reserved(Username),
    /// On loan to the holder.
    Borrowed(Username),
}

impl BookStatus {
    /// The user currently holding the book, if any.
    #[must_use]
    pub fn holder(&self) -> Option<&Username> {
        match self {
            Self::Available => None,
            Self::Reserved(holder) | Self::Borrowed(holder) => Some(holder),
        }
    }

    /// Holder-free discriminant, used for wire names and log fields.
    #[must_use]
    pub fn kind(&self) -> BookStatusKind {
        match self {
            Self::Available => BookStatusKind::Available,
            Self::Reserved(_) => BookStatusKind::Reserved,
            Self::Borrowed(_) => BookStatusKind::Borrowed,
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.holder() {
            Some(holder) => write!(f, "{} by {holder}", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// Status name without the holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatusKind {
    Available,
    Reserved,
    Borrowed,
}

impl BookStatusKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Borrowed => "borrowed",
        }
    }
}

impl fmt::Display for BookStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookStatusKind {
    type Err = BookValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "borrowed" => Ok(Self::Borrowed),
            other => Err(BookValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Cover image bytes. Opaque to the lifecycle logic.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CoverImage(Vec<u8>);

impl CoverImage {
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a `data:` URL or bare base64 text.
    ///
    /// Blank or undecodable input yields `None` rather than an error, so a
    /// broken upload never blocks the rest of the record.
    ///
    /// # Examples
    /// ```
    /// use biblioteka::domain::CoverImage;
    ///
    /// let image = CoverImage::from_data_url("data:image/png;base64,AQID").expect("decodes");
    /// assert_eq!(image.as_bytes(), &[1, 2, 3]);
    /// assert!(CoverImage::from_data_url("%%%").is_none());
    /// ```
    #[must_use]
    pub fn from_data_url(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let payload = match trimmed.strip_prefix("data:") {
            Some(rest) => rest.split_once(',').map(|(_, data)| data)?,
            None => trimmed,
        };
        if payload.is_empty() {
            return None;
        }
        STANDARD.decode(payload).ok().map(Self)
    }

    /// Encode as a JPEG `data:` URL for clients.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("{DATA_URL_PREFIX}{}", STANDARD.encode(&self.0))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CoverImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoverImage({} bytes)", self.0.len())
    }
}

/// Descriptive fields shared by creation and edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    title: String,
    author: String,
    isbn: Option<String>,
}

impl BookDetails {
    /// Validate descriptive fields. Blank ISBNs become `None`.
    pub fn try_new(
        title: &str,
        author: &str,
        isbn: Option<&str>,
    ) -> Result<Self, BookValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        let author = author.trim();
        if author.is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        let isbn = isbn
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        Ok(Self {
            title: title.to_owned(),
            author: author.to_owned(),
            isbn,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    #[must_use]
    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }
}

/// Input for creating a book. New books always start available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub details: BookDetails,
    pub image: Option<CoverImage>,
}

/// Input for editing a book's descriptive fields.
///
/// Carries no status, so an edit can never move a book through the lifecycle.
/// `image: None` keeps the current cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEdit {
    pub details: BookDetails,
    pub image: Option<CoverImage>,
}

/// A catalogue entry.
///
/// ## Invariants
/// - `id` never changes after creation.
/// - The holder is present exactly when the status is reserved or borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    details: BookDetails,
    image: Option<CoverImage>,
    status: BookStatus,
}

impl Book {
    /// Materialise a new available book from a draft.
    #[must_use]
    pub fn create(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            details: draft.details,
            image: draft.image,
            status: BookStatus::Available,
        }
    }

    #[must_use]
    pub fn id(&self) -> BookId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.details.title()
    }

    #[must_use]
    pub fn author(&self) -> &str {
        self.details.author()
    }

    #[must_use]
    pub fn isbn(&self) -> Option<&str> {
        self.details.isbn()
    }

    #[must_use]
    pub fn image(&self) -> Option<&CoverImage> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> &BookStatus {
        &self.status
    }

    /// Apply descriptive edits, leaving the status untouched.
    pub fn apply_edit(&mut self, edit: BookEdit) {
        self.details = edit.details;
        if let Some(image) = edit.image {
            self.image = Some(image);
        }
    }

    /// Replace the status. Only the catalogue store calls this, under its
    /// compare-and-set.
    pub fn set_status(&mut self, status: BookStatus) {
        self.status = status;
    }

    /// Case-insensitive substring match over title and author.
    ///
    /// A blank query matches every book.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title().to_lowercase().contains(&needle)
            || self.author().to_lowercase().contains(&needle)
    }
}
