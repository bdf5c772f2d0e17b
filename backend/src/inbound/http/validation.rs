//! Request validation helpers shared by the HTTP handlers.
//!
//! Every validation failure becomes `invalid_request` with `details`
//! naming the offending field and a machine-readable reason, e.g.
//! `{"field": "title", "code": "empty"}`.

use serde_json::json;

use crate::domain::{
    BookId, BookValidationError, Error, LoginValidationError, RegistrationValidationError,
    UserValidationError,
};

/// Machine-readable validation reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReasonCode {
    Empty,
    TooShort,
    TooLong,
    InvalidCharacters,
    InvalidUuid,
    Invalid,
}

impl ReasonCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidUuid => "invalid_uuid",
            Self::Invalid => "invalid",
        }
    }
}

pub(crate) fn field_error(field: &str, code: ReasonCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Parse a path segment into a [`BookId`].
pub(crate) fn parse_book_id(raw: &str) -> Result<BookId, Error> {
    BookId::new(raw).map_err(|_| {
        Error::invalid_request("book id must be a valid UUID").with_details(json!({
            "field": "id",
            "value": raw,
            "code": ReasonCode::InvalidUuid.as_str(),
        }))
    })
}

fn username_reason(err: &UserValidationError) -> ReasonCode {
    match err {
        UserValidationError::EmptyUsername => ReasonCode::Empty,
        UserValidationError::UsernameTooShort { .. } => ReasonCode::TooShort,
        UserValidationError::UsernameTooLong { .. } => ReasonCode::TooLong,
        UserValidationError::UsernameInvalidCharacters => ReasonCode::InvalidCharacters,
        _ => ReasonCode::Invalid,
    }
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyUsername => "username",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(field, ReasonCode::Empty, err.to_string())
}

pub(crate) fn map_registration_validation_error(err: RegistrationValidationError) -> Error {
    match &err {
        RegistrationValidationError::Username(inner) => {
            field_error("username", username_reason(inner), err.to_string())
        }
        RegistrationValidationError::PasswordTooShort { .. } => {
            field_error("password", ReasonCode::TooShort, err.to_string())
        }
    }
}

pub(crate) fn map_book_validation_error(err: BookValidationError) -> Error {
    let (field, code) = match &err {
        BookValidationError::EmptyTitle => ("title", ReasonCode::Empty),
        BookValidationError::EmptyAuthor => ("author", ReasonCode::Empty),
        BookValidationError::InvalidId => ("id", ReasonCode::InvalidUuid),
        _ => ("status", ReasonCode::Invalid),
    };
    field_error(field, code, err.to_string())
}
