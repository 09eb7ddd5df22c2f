//! Database operations for users.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    password::PasswordHash,
    user::{Email, NewUser, User, UserID},
};

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if the email is already registered, or
/// [Error::SqlError] if some other SQL error occurred.
pub fn insert_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            &new_user.name,
            new_user.email.as_ref(),
            new_user.password_hash.as_ref(),
            new_user.created_at,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        created_at: new_user.created_at,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user,
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(map_missing_user)
}

/// Get the user registered with `email`.
///
/// The email must match exactly.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, email, password, created_at FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_row)
        .map_err(map_missing_user)
}

/// Replace the name and email of a user.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if no user has the ID `user_id`, or
/// [Error::DuplicateEmail] if the new email belongs to another user.
pub fn update_user_profile(
    user_id: UserID,
    name: &str,
    email: &Email,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET name = ?1, email = ?2 WHERE id = ?3",
        (name, email.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UserNotFound);
    }

    Ok(())
}

/// Replace the password hash of a user.
pub fn update_password_hash(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UserNotFound);
    }

    Ok(())
}

/// Delete the user row. Plans owned by the user must already be gone.
pub(crate) fn delete_user_row(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM user WHERE id = ?1", [user_id.as_i64()])?;

    if rows_affected == 0 {
        return Err(Error::UserNotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(4)?,
    })
}

fn map_missing_user(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::UserNotFound,
        error => error.into(),
    }
}
