//! Database initialization and helpers shared by the domain modules.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, budget_plan::create_budget_plan_tables, category::create_category_table,
    expense::create_expense_table, user::create_user_table,
};

/// Create the application tables if they do not exist yet.
///
/// Also turns on foreign key enforcement for `connection`, which the
/// association table relies on to reject deleting a plan or expense that is
/// still linked.
///
/// # Errors
///
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must happen outside of a transaction, otherwise it is a no-op.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_budget_plan_tables(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Start a transaction that takes the database write lock immediately.
///
/// Multi-step mutations run inside one of these so that they either apply in
/// full or not at all, and so read-modify-write sequences cannot interleave.
pub fn begin_write(connection: &Connection) -> Result<Transaction<'_>, Error> {
    Transaction::new_unchecked(connection, TransactionBehavior::Immediate).map_err(Error::from)
}

/// Acquire the shared database connection.
///
/// # Errors
///
/// Returns [Error::DatabaseLockError] if the mutex has been poisoned.
pub fn lock_connection(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
