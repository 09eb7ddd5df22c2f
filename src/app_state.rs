//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, auth::TokenKeys, db::initialize, password::PasswordHash};

/// The state of the REST server.
///
/// Every dependency a handler needs is a field here, built once at startup
/// and handed to the router.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys used to sign and verify tokens.
    pub token_keys: TokenKeys,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, token_keys: TokenKeys) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            token_keys,
            password_hash_cost: PasswordHash::DEFAULT_COST,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }

    /// Use `cost` when hashing passwords instead of the default.
    ///
    /// Tests use a low cost to keep them fast.
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }
}
