//! Budget plan operations: ownership, the running total and the set of linked expenses.
//!
//! Every operation after creation takes the ID of the acting user and treats a
//! plan owned by someone else as missing. Operations that write more than one
//! row run in a single transaction.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    budget_plan::{
        AmountAdjustment, BudgetPlan, BudgetPlanId, BudgetPlanUpdate, NewBudgetPlan,
        db::{
            delete_budget_plan_row, delete_expense_link, delete_expense_links_of_plan,
            get_budget_plan_rows_by_user, get_owned_budget_plan_row, insert_budget_plan,
            insert_expense_link, set_total_amount, update_budget_plan_row,
        },
    },
    db::begin_write,
    expense::{ExpenseId, get_expenses_by_plan, is_expense_owned_by},
    user::{Email, UserID, get_user_by_email},
};

/// Create an empty plan owned by the user registered with `owner_email`.
///
/// # Errors
///
/// Returns [Error::UserNotFound] if no user has `owner_email` and
/// [Error::EmptyName] if the plan name is blank.
pub fn create_budget_plan(
    new_plan: NewBudgetPlan,
    owner_email: &Email,
    connection: &Connection,
) -> Result<BudgetPlan, Error> {
    let name = new_plan.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let owner = get_user_by_email(owner_email.as_ref(), connection)?;
    let now = OffsetDateTime::now_utc();
    let created_at = now.replace_nanosecond(0).unwrap_or(now);

    let id = insert_budget_plan(
        name,
        &new_plan.description,
        created_at,
        owner.id,
        connection,
    )?;

    Ok(BudgetPlan {
        id,
        name: name.to_owned(),
        total_amount: 0.0,
        description: new_plan.description,
        created_at,
        user_id: owner.id,
        expenses: Vec::new(),
    })
}

/// Get a plan owned by `user_id` together with its linked expenses.
///
/// # Errors
///
/// Returns [Error::BudgetPlanNotFound] if `user_id` owns no plan with `plan_id`.
pub fn get_budget_plan(
    plan_id: BudgetPlanId,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetPlan, Error> {
    let mut plan = get_owned_budget_plan_row(plan_id, user_id, connection)?;
    plan.expenses = get_expenses_by_plan(plan.id, connection)?;

    Ok(plan)
}

/// Get every plan owned by `user_id`, each with its linked expenses.
pub fn get_budget_plans_by_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetPlan>, Error> {
    get_budget_plan_rows_by_user(user_id, connection)?
        .into_iter()
        .map(|mut plan| -> Result<BudgetPlan, Error> {
            plan.expenses = get_expenses_by_plan(plan.id, connection)?;
            Ok(plan)
        })
        .collect()
}

/// Add to or subtract from the total of a plan and return the updated plan.
///
/// This is the only way the total changes. The new total is not clamped, so it
/// may go below zero.
pub fn update_budget_plan_amount(
    adjustment: AmountAdjustment,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetPlan, Error> {
    let transaction = begin_write(connection)?;

    let plan = get_owned_budget_plan_row(adjustment.id, user_id, &transaction)?;
    let total_amount = adjustment.apply(plan.total_amount);
    set_total_amount(plan.id, total_amount, &transaction)?;

    transaction.commit()?;

    tracing::debug!(
        "Adjusted total of budget plan {} from {} to {total_amount}",
        plan.id,
        plan.total_amount
    );

    get_budget_plan(plan.id, user_id, connection)
}

/// Replace the name, description and linked expenses of a plan.
///
/// `update.expense_ids` is the complete set of expenses the plan is linked to
/// afterwards. The total is left unchanged.
///
/// # Errors
///
/// Returns [Error::ExpenseNotFound] if any of the expense IDs does not exist or
/// is not linked to a plan owned by `user_id`, in which case nothing is changed.
pub fn update_budget_plan(
    plan_id: BudgetPlanId,
    update: BudgetPlanUpdate,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetPlan, Error> {
    let name = update.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let mut expense_ids = update.expense_ids;
    expense_ids.sort_unstable();
    expense_ids.dedup();

    let transaction = begin_write(connection)?;

    get_owned_budget_plan_row(plan_id, user_id, &transaction)?;

    // Must run before this plan's links are deleted.
    for &expense_id in &expense_ids {
        if !is_expense_owned_by(expense_id, user_id, &transaction)? {
            return Err(Error::ExpenseNotFound);
        }
    }

    update_budget_plan_row(plan_id, name, &update.description, &transaction)?;
    delete_expense_links_of_plan(plan_id, &transaction)?;

    for expense_id in expense_ids {
        insert_expense_link(plan_id, expense_id, &transaction)?;
    }

    transaction.commit()?;

    get_budget_plan(plan_id, user_id, connection)
}

/// Delete a plan after removing its expense links.
///
/// The expenses themselves are kept.
pub fn delete_budget_plan(
    plan_id: BudgetPlanId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = begin_write(connection)?;

    get_owned_budget_plan_row(plan_id, user_id, &transaction)?;
    let links_removed = delete_expense_links_of_plan(plan_id, &transaction)?;
    delete_budget_plan_row(plan_id, &transaction)?;

    transaction.commit()?;

    tracing::debug!("Deleted budget plan {plan_id} and {links_removed} expense links");

    Ok(())
}

/// Remove the link between a plan and an expense without touching the total.
///
/// # Errors
///
/// Returns [Error::ExpenseLinkNotFound] if the expense is not linked to the plan.
pub fn unlink_expense(
    plan_id: BudgetPlanId,
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_owned_budget_plan_row(plan_id, user_id, connection)?;

    match delete_expense_link(plan_id, expense_id, connection)? {
        0 => Err(Error::ExpenseLinkNotFound),
        _ => Ok(()),
    }
}
