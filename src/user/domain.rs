//! Core user domain types.

use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, password::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create and validate an email address.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `raw_email` is not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let raw_email = raw_email.trim();

        if EmailAddress::is_valid(raw_email) {
            Ok(Self(raw_email.to_owned()))
        } else {
            Err(Error::InvalidEmail(raw_email.to_owned()))
        }
    }

    /// Create a new `Email` without any validation.
    ///
    /// For emails coming from a client this function should **not** be used,
    /// use the checked version instead.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The ID of the user.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email the user logs in with. Unique across users.
    pub email: Email,
    /// The bcrypt hash of the user's password.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The email the user logs in with.
    pub email: Email,
    /// The hash of the password chosen at registration.
    pub password_hash: PasswordHash,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}
