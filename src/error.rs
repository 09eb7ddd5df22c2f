//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The broad class an [Error] belongs to.
///
/// The HTTP boundary only needs to know the kind of an error to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request clashes with existing data, e.g. a duplicate email.
    Conflict,
    /// A record referenced by the request does not exist.
    NotFound,
    /// The caller could not be authenticated.
    Unauthorized,
    /// The request was understood but its contents are not acceptable.
    InvalidArgument,
    /// Something went wrong on the server, e.g. a storage failure.
    Internal,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email is already registered to another user.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// A category with the same name already exists.
    ///
    /// Names are compared exactly, so "Food" and "food" are different names.
    #[error("a category with that name already exists")]
    DuplicateCategoryName,

    /// Tried to delete a category that expenses still refer to.
    #[error("the category is still used by one or more expenses")]
    CategoryInUse,

    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The Authorization header was missing, malformed, or held a token that
    /// is expired or was not signed with the server's key.
    #[error("missing or invalid token")]
    InvalidToken,

    /// The token for a successful log-in could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The signing secret for tokens was empty or missing.
    #[error("the token signing secret must not be empty")]
    MissingSecret,

    /// The configured CORS origin is not a valid header value.
    #[error("invalid allowed origin \"{0}\"")]
    InvalidOrigin(String),

    /// The string is not a valid email address.
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The new password is the same as the current password.
    #[error("the new password must be different from the current password")]
    PasswordUnchanged,

    /// An empty string was used for a name.
    #[error("name cannot be empty")]
    EmptyName,

    /// The query string did not contain a usable filter.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The user resolved from a token or ID is not in the database.
    #[error("user does not exist")]
    UserNotFound,

    /// The referenced category is not in the database.
    #[error("category not found")]
    CategoryNotFound,

    /// The referenced budget plan is not in the database, or belongs to
    /// another user.
    #[error("budget plan not found")]
    BudgetPlanNotFound,

    /// The referenced expense is not in the database, or is not linked to a
    /// plan the acting user owns.
    #[error("expense not found")]
    ExpenseNotFound,

    /// The budget plan is not linked to the expense.
    #[error("the expense is not linked to the budget plan")]
    ExpenseLinkNotFound,

    /// A write referenced a row that does not exist (foreign key violation).
    #[error("the request references a record that does not exist")]
    InvalidReference,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateEmail | Error::DuplicateCategoryName | Error::CategoryInUse => {
                ErrorKind::Conflict
            }
            Error::InvalidCredentials | Error::InvalidToken => ErrorKind::Unauthorized,
            Error::InvalidEmail(_)
            | Error::TooWeak(_)
            | Error::PasswordUnchanged
            | Error::EmptyName
            | Error::InvalidQuery(_) => ErrorKind::InvalidArgument,
            Error::UserNotFound
            | Error::CategoryNotFound
            | Error::BudgetPlanNotFound
            | Error::ExpenseNotFound
            | Error::ExpenseLinkNotFound
            | Error::InvalidReference
            | Error::NotFound => ErrorKind::NotFound,
            Error::TokenCreation(_)
            | Error::MissingSecret
            | Error::InvalidOrigin(_)
            | Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => ErrorKind::Internal,
        }
    }

    /// The HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::InvalidReference
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self.kind() {
            // Internal errors are not intended to be shown to the client.
            ErrorKind::Internal => {
                tracing::error!("An unexpected error occurred: {}", self);
                "internal server error".to_owned()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
