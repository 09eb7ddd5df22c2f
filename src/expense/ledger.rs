//! Recording, changing and removing expenses.
//!
//! An expense is reachable by a user through the plans they own. Creating an
//! expense writes the expense and its link to the plan in one transaction, and
//! deleting one removes its links before the expense itself.

use rusqlite::Connection;

use crate::{
    Error,
    budget_plan::{
        BudgetPlanId, delete_expense_link, delete_expense_links_of_expense,
        get_owned_budget_plan_row, insert_expense_link,
    },
    category::{CategoryId, find_category},
    db::begin_write,
    expense::{
        Expense, ExpenseId, ExpenseUpdate, NewExpense,
        db::{
            delete_expense_row, get_expense, get_expenses_by_category, get_expenses_by_plan,
            insert_expense, is_expense_owned_by, update_expense_row,
        },
    },
    user::UserID,
};

/// Record a new expense and link it to the plan it was created against.
///
/// The plan's total is not changed.
///
/// # Errors
///
/// Returns [Error::BudgetPlanNotFound] if `user_id` owns no such plan and
/// [Error::CategoryNotFound] if the category does not exist. Nothing is
/// written in either case.
pub fn create_expense(
    new_expense: NewExpense,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = begin_write(connection)?;

    get_owned_budget_plan_row(new_expense.budget_plan_id, user_id, &transaction)?;

    if find_category(new_expense.category_id, &transaction)?.is_none() {
        return Err(Error::CategoryNotFound);
    }

    let expense = insert_expense(&new_expense, &transaction)?;
    insert_expense_link(new_expense.budget_plan_id, expense.id, &transaction)?;

    transaction.commit()?;

    Ok(expense)
}

/// Delete an expense that is linked to `plan_id`.
///
/// The link to `plan_id` goes first, then any other links of the expense, then
/// the expense. If any step fails nothing is deleted.
///
/// # Errors
///
/// Returns [Error::BudgetPlanNotFound] if `user_id` owns no such plan and
/// [Error::ExpenseNotFound] if the expense is not linked to the plan.
pub fn delete_expense(
    expense_id: ExpenseId,
    plan_id: BudgetPlanId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = begin_write(connection)?;

    get_owned_budget_plan_row(plan_id, user_id, &transaction)?;

    if delete_expense_link(plan_id, expense_id, &transaction)? == 0 {
        return Err(Error::ExpenseNotFound);
    }

    delete_expense_links_of_expense(expense_id, &transaction)?;
    delete_expense_row(expense_id, &transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Change the amount, description, date and recurrence of an expense.
///
/// Plan totals are left alone.
///
/// # Errors
///
/// Returns [Error::ExpenseNotFound] if the expense is not linked to any plan
/// owned by `user_id`.
pub fn update_expense(
    expense_id: ExpenseId,
    update: ExpenseUpdate,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    if !is_expense_owned_by(expense_id, user_id, connection)? {
        return Err(Error::ExpenseNotFound);
    }

    update_expense_row(expense_id, &update, connection)?;

    get_expense(expense_id, connection)
}

/// Get the expenses linked to a plan owned by `user_id`.
pub fn get_plan_expenses(
    plan_id: BudgetPlanId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    get_owned_budget_plan_row(plan_id, user_id, connection)?;

    get_expenses_by_plan(plan_id, connection)
}

/// Get the expenses in a category that belong to plans owned by `user_id`.
pub fn get_category_expenses(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    get_expenses_by_category(category_id, user_id, connection)
}
