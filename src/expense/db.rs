//! Database operations for expenses.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    budget_plan::BudgetPlanId,
    category::CategoryId,
    expense::{Expense, ExpenseId, ExpenseUpdate, NewExpense},
    user::UserID,
};

const EXPENSE_COLUMNS: &str =
    "expense.id, expense.amount, expense.description, expense.category_id, expense.date, \
    expense.is_recurring, expense.budget_plan_id";

/// Initialize the expense table and indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES category(id),
            date TEXT NOT NULL,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            budget_plan_id INTEGER REFERENCES budget_plan(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_category ON expense(category_id);",
    )?;

    Ok(())
}

/// Insert the expense row only. Linking it to a plan is up to the caller.
pub(crate) fn insert_expense(
    new_expense: &NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (amount, description, category_id, date, is_recurring, budget_plan_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            new_expense.amount,
            &new_expense.description,
            new_expense.category_id,
            new_expense.date,
            new_expense.is_recurring,
            new_expense.budget_plan_id,
        ),
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        amount: new_expense.amount,
        description: new_expense.description.clone(),
        category_id: new_expense.category_id,
        date: new_expense.date,
        is_recurring: new_expense.is_recurring,
        budget_plan_id: Some(new_expense.budget_plan_id),
    })
}

/// Retrieve a single expense by ID.
///
/// # Errors
///
/// Returns [Error::ExpenseNotFound] if there is no such expense.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense WHERE expense.id = :id"
        ))?
        .query_row(&[(":id", &expense_id)], map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::ExpenseNotFound,
            error => error.into(),
        })
}

/// Retrieve the expenses linked to a budget plan, oldest first.
pub fn get_expenses_by_plan(
    budget_plan_id: BudgetPlanId,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
            INNER JOIN budget_plan_expense ON budget_plan_expense.expense_id = expense.id
            WHERE budget_plan_expense.budget_plan_id = ?1
            ORDER BY expense.date ASC, expense.id ASC"
        ))?
        .query_map([budget_plan_id], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the expenses filed under a category that are linked to at least
/// one plan owned by `user_id`, oldest first.
pub fn get_expenses_by_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT DISTINCT {EXPENSE_COLUMNS} FROM expense
            INNER JOIN budget_plan_expense ON budget_plan_expense.expense_id = expense.id
            INNER JOIN budget_plan ON budget_plan.id = budget_plan_expense.budget_plan_id
            WHERE expense.category_id = ?1 AND budget_plan.user_id = ?2
            ORDER BY expense.date ASC, expense.id ASC"
        ))?
        .query_map((category_id, user_id.as_i64()), map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Whether the expense is linked to at least one plan owned by `user_id`.
pub(crate) fn is_expense_owned_by(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS (
                SELECT 1 FROM budget_plan_expense
                INNER JOIN budget_plan ON budget_plan.id = budget_plan_expense.budget_plan_id
                WHERE budget_plan_expense.expense_id = ?1 AND budget_plan.user_id = ?2
            )",
            (expense_id, user_id.as_i64()),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Replace the amount, description, date and recurrence of an expense.
pub(crate) fn update_expense_row(
    expense_id: ExpenseId,
    update: &ExpenseUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET amount = ?1, description = ?2, date = ?3, is_recurring = ?4
        WHERE id = ?5",
        (
            update.amount,
            &update.description,
            update.date,
            update.is_recurring,
            expense_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::ExpenseNotFound);
    }

    Ok(())
}

/// Delete the expense row. Fails with [Error::InvalidReference] while any
/// plan is still linked to it.
pub(crate) fn delete_expense_row(
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [expense_id])?;

    if rows_affected == 0 {
        return Err(Error::ExpenseNotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        category_id: row.get(3)?,
        date: row.get(4)?,
        is_recurring: row.get(5)?,
        budget_plan_id: row.get(6)?,
    })
}
