//! Authentication primitives: login credentials and registration input.
//!
//! Inbound adapters call these constructors before talking to a port, so
//! services only ever see validated values.

use zeroize::Zeroizing;

use crate::domain::{UserValidationError, Username};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 3;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use biblioteka::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin ", "secret").expect("valid");
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while validating a registration request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    Username(#[from] UserValidationError),
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

/// Validated sign-up request.
///
/// # Examples
/// ```
/// use biblioteka::domain::Registration;
///
/// assert!(Registration::try_from_parts("carol", "pw").is_err());
/// let reg = Registration::try_from_parts("carol", "pwd").expect("valid");
/// assert_eq!(reg.username().as_ref(), "carol");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate a username and password pair.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(RegistrationValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
