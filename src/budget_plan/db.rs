//! Database operations for budget plans and their links to expenses.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    budget_plan::{BudgetPlan, BudgetPlanId},
    expense::ExpenseId,
    user::UserID,
};

/// Create the budget plan table and the table that links plans to expenses.
///
/// Links do not cascade, so a plan or expense that is still linked cannot be
/// deleted until its links are.
pub fn create_budget_plan_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget_plan (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            total_amount REAL NOT NULL DEFAULT 0,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL,
            user_id INTEGER NOT NULL REFERENCES user(id)
        );

        CREATE INDEX IF NOT EXISTS idx_budget_plan_user ON budget_plan(user_id);

        CREATE TABLE IF NOT EXISTS budget_plan_expense (
            budget_plan_id INTEGER NOT NULL REFERENCES budget_plan(id),
            expense_id INTEGER NOT NULL REFERENCES expense(id),
            PRIMARY KEY (budget_plan_id, expense_id)
        );

        CREATE INDEX IF NOT EXISTS idx_budget_plan_expense_expense
            ON budget_plan_expense(expense_id);",
    )?;

    Ok(())
}

/// Insert a plan with a total of zero and return its ID.
pub(crate) fn insert_budget_plan(
    name: &str,
    description: &str,
    created_at: OffsetDateTime,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetPlanId, Error> {
    connection.execute(
        "INSERT INTO budget_plan (name, total_amount, description, created_at, user_id)
        VALUES (?1, 0, ?2, ?3, ?4)",
        (name, description, created_at, user_id.as_i64()),
    )?;

    Ok(connection.last_insert_rowid())
}

/// Get the plan row without its expenses.
///
/// A plan that exists but belongs to someone else is reported the same way as
/// a plan that does not exist.
///
/// # Errors
///
/// Returns [Error::BudgetPlanNotFound] if `user_id` has no plan with `plan_id`.
pub(crate) fn get_owned_budget_plan_row(
    plan_id: BudgetPlanId,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetPlan, Error> {
    connection
        .prepare(
            "SELECT id, name, total_amount, description, created_at, user_id
            FROM budget_plan WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((plan_id, user_id.as_i64()), map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::BudgetPlanNotFound,
            error => error.into(),
        })
}

/// Get the rows of all plans owned by `user_id`, oldest first, without their expenses.
pub(crate) fn get_budget_plan_rows_by_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetPlan>, Error> {
    connection
        .prepare(
            "SELECT id, name, total_amount, description, created_at, user_id
            FROM budget_plan WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_plan| maybe_plan.map_err(|error| error.into()))
        .collect()
}

pub(crate) fn set_total_amount(
    plan_id: BudgetPlanId,
    total_amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget_plan SET total_amount = ?1 WHERE id = ?2",
        (total_amount, plan_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::BudgetPlanNotFound);
    }

    Ok(())
}

pub(crate) fn update_budget_plan_row(
    plan_id: BudgetPlanId,
    name: &str,
    description: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget_plan SET name = ?1, description = ?2 WHERE id = ?3",
        (name, description, plan_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::BudgetPlanNotFound);
    }

    Ok(())
}

/// Delete the plan row. Fails with [Error::InvalidReference] while any
/// expense is still linked to it.
pub(crate) fn delete_budget_plan_row(
    plan_id: BudgetPlanId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget_plan WHERE id = ?1", [plan_id])?;

    if rows_affected == 0 {
        return Err(Error::BudgetPlanNotFound);
    }

    Ok(())
}

/// Delete every plan owned by `user_id` along with the plans' expense links.
///
/// The caller is expected to run this inside a transaction.
pub(crate) fn delete_budget_plans_of_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM budget_plan_expense
        WHERE budget_plan_id IN (SELECT id FROM budget_plan WHERE user_id = ?1)",
        [user_id.as_i64()],
    )?;
    connection.execute(
        "DELETE FROM budget_plan WHERE user_id = ?1",
        [user_id.as_i64()],
    )?;

    Ok(())
}

/// Link an expense to a plan.
pub(crate) fn insert_expense_link(
    plan_id: BudgetPlanId,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO budget_plan_expense (budget_plan_id, expense_id) VALUES (?1, ?2)",
        (plan_id, expense_id),
    )?;

    Ok(())
}

/// Remove the link between a plan and an expense, returning the number of
/// links removed (zero or one).
pub(crate) fn delete_expense_link(
    plan_id: BudgetPlanId,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM budget_plan_expense WHERE budget_plan_id = ?1 AND expense_id = ?2",
            (plan_id, expense_id),
        )
        .map_err(Error::from)
}

/// Remove every link of a plan, returning the number of links removed.
pub(crate) fn delete_expense_links_of_plan(
    plan_id: BudgetPlanId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM budget_plan_expense WHERE budget_plan_id = ?1",
            [plan_id],
        )
        .map_err(Error::from)
}

/// Remove every link of an expense, returning the number of links removed.
pub(crate) fn delete_expense_links_of_expense(
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM budget_plan_expense WHERE expense_id = ?1",
            [expense_id],
        )
        .map_err(Error::from)
}

/// Count the expenses linked to a plan.
#[cfg(test)]
pub(crate) fn count_expense_links(
    plan_id: BudgetPlanId,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM budget_plan_expense WHERE budget_plan_id = ?1",
            [plan_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn map_row(row: &Row) -> Result<BudgetPlan, rusqlite::Error> {
    Ok(BudgetPlan {
        id: row.get(0)?,
        name: row.get(1)?,
        total_amount: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
        expenses: Vec::new(),
    })
}

#[cfg(test)]
mod budget_plan_query_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        password::PasswordHash,
        user::{Email, NewUser, User, UserID, insert_user},
    };

    use super::{
        count_expense_links, delete_budget_plan_row, get_budget_plan_rows_by_user,
        get_owned_budget_plan_row, insert_budget_plan, set_total_amount,
    };

    fn get_test_db_connection() -> (Connection, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_user(
            NewUser {
                name: "Foo".to_owned(),
                email: Email::new_unchecked("foo@bar.baz"),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                created_at: datetime!(2025-01-01 00:00 UTC),
            },
            &connection,
        )
        .unwrap();

        (connection, user)
    }

    #[test]
    fn insert_plan_starts_at_zero() {
        let (connection, user) = get_test_db_connection();

        let id = insert_budget_plan(
            "Holiday",
            "Saving for Japan",
            datetime!(2025-02-01 09:00 UTC),
            user.id,
            &connection,
        )
        .unwrap();

        let plan = get_owned_budget_plan_row(id, user.id, &connection).unwrap();
        assert_eq!(plan.total_amount, 0.0);
        assert_eq!(plan.name, "Holiday");
        assert_eq!(plan.created_at, datetime!(2025-02-01 09:00 UTC));
        assert!(plan.expenses.is_empty());
        assert_eq!(count_expense_links(id, &connection), Ok(0));
    }

    #[test]
    fn plan_of_other_user_is_not_found() {
        let (connection, user) = get_test_db_connection();
        let id = insert_budget_plan(
            "Holiday",
            "",
            datetime!(2025-02-01 09:00 UTC),
            user.id,
            &connection,
        )
        .unwrap();

        let result = get_owned_budget_plan_row(id, UserID::new(user.id.as_i64() + 1), &connection);

        assert_eq!(result, Err(Error::BudgetPlanNotFound));
    }

    #[test]
    fn insert_plan_fails_for_unknown_user() {
        let (connection, _) = get_test_db_connection();

        let result = insert_budget_plan(
            "Holiday",
            "",
            datetime!(2025-02-01 09:00 UTC),
            UserID::new(999),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidReference));
    }

    #[test]
    fn get_plans_by_user_lists_oldest_first() {
        let (connection, user) = get_test_db_connection();
        let newer = insert_budget_plan(
            "B",
            "",
            datetime!(2025-03-01 00:00 UTC),
            user.id,
            &connection,
        )
        .unwrap();
        let older = insert_budget_plan(
            "A",
            "",
            datetime!(2025-02-01 00:00 UTC),
            user.id,
            &connection,
        )
        .unwrap();

        let ids: Vec<_> = get_budget_plan_rows_by_user(user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|plan| plan.id)
            .collect();

        assert_eq!(ids, vec![older, newer]);
    }

    #[test]
    fn set_total_amount_on_missing_plan_returns_not_found() {
        let (connection, _) = get_test_db_connection();

        assert_eq!(
            set_total_amount(42, 10.0, &connection),
            Err(Error::BudgetPlanNotFound)
        );
    }

    #[test]
    fn delete_missing_plan_returns_not_found() {
        let (connection, _) = get_test_db_connection();

        assert_eq!(
            delete_budget_plan_row(42, &connection),
            Err(Error::BudgetPlanNotFound)
        );
    }
}
