//! Registration, log-in and account management for users.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{Claims, TokenKeys, issue_token},
    budget_plan::delete_budget_plans_of_user,
    db::begin_write,
    password::PasswordHash,
    user::{
        Email, NewUser, User, UserID,
        db::{
            delete_user_row, get_user_by_email, get_user_by_id, insert_user, update_password_hash,
            update_user_profile,
        },
    },
};

/// Register a new user.
///
/// The password is checked for strength and hashed with `password_hash_cost`
/// before it is stored.
///
/// # Errors
///
/// This function will return an error if:
/// - `name` is empty ([Error::EmptyName]),
/// - `email` is already registered ([Error::DuplicateEmail]),
/// - the password is too weak ([Error::TooWeak]),
/// - hashing or the SQL query failed.
pub fn register_user(
    name: &str,
    email: Email,
    raw_password: &str,
    password_hash_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    // Hashing is slow, so reject a taken email before doing it.
    match get_user_by_email(email.as_ref(), connection) {
        Ok(_) => return Err(Error::DuplicateEmail),
        Err(Error::UserNotFound) => {}
        Err(error) => return Err(error),
    }

    let password_hash = PasswordHash::from_raw_password(raw_password, password_hash_cost)?;
    let now = OffsetDateTime::now_utc();

    insert_user(
        NewUser {
            name: name.to_owned(),
            email,
            password_hash,
            created_at: now.replace_nanosecond(0).unwrap_or(now),
        },
        connection,
    )
}

/// Check `raw_password` against the stored hash for `email` and issue a token.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the email is not registered or the
/// password does not match. The two cases are deliberately indistinguishable.
pub fn log_in(
    email: &str,
    raw_password: &str,
    token_keys: &TokenKeys,
    connection: &Connection,
) -> Result<String, Error> {
    let user = match get_user_by_email(email.trim(), connection) {
        Ok(user) => user,
        Err(Error::UserNotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    if !user.password_hash.verify(raw_password)? {
        return Err(Error::InvalidCredentials);
    }

    issue_token(&user.email, token_keys)
}

/// Resolve the user a verified token was issued to.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if the account was deleted, or its email
/// changed, after the token was issued.
pub fn get_acting_user(claims: &Claims, connection: &Connection) -> Result<User, Error> {
    get_user_by_email(claims.sub.as_ref(), connection)
}

/// Replace the password of `user`.
///
/// # Errors
///
/// Returns [Error::PasswordUnchanged] if `new_password` is the current
/// password and [Error::TooWeak] if it is too easy to guess.
pub fn change_password(
    user: &User,
    new_password: &str,
    password_hash_cost: u32,
    connection: &Connection,
) -> Result<(), Error> {
    if user.password_hash.verify(new_password)? {
        return Err(Error::PasswordUnchanged);
    }

    let password_hash = PasswordHash::from_raw_password(new_password, password_hash_cost)?;

    update_password_hash(user.id, &password_hash, connection)
}

/// Change the name and email of a user and return the updated user.
///
/// Tokens are bound to the email, so after an email change the user needs to
/// log in again.
pub fn update_user(
    user_id: UserID,
    name: &str,
    email: &Email,
    connection: &Connection,
) -> Result<User, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    update_user_profile(user_id, name, email, connection)?;

    get_user_by_id(user_id, connection)
}

/// Delete a user along with the budget plans they own.
///
/// The plans' expense links go first, then the plans, then the user. All of it
/// happens in one transaction.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if there is no user with `user_id`.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let transaction = begin_write(connection)?;

    delete_budget_plans_of_user(user_id, &transaction)?;
    delete_user_row(user_id, &transaction)?;

    transaction.commit()?;

    Ok(())
}
