//! Budget plans: per-user plans with a running total and linked expenses.

mod aggregator;
mod db;
mod domain;
mod endpoints;

pub use aggregator::{
    create_budget_plan, delete_budget_plan, get_budget_plan, get_budget_plans_by_user,
    unlink_expense, update_budget_plan, update_budget_plan_amount,
};
pub use db::create_budget_plan_tables;
#[cfg(test)]
pub(crate) use db::count_expense_links;
pub(crate) use db::{
    delete_budget_plans_of_user, delete_expense_link, delete_expense_links_of_expense,
    get_owned_budget_plan_row, insert_expense_link,
};
pub use domain::{AmountAdjustment, BudgetPlan, BudgetPlanId, BudgetPlanUpdate, NewBudgetPlan};
pub use endpoints::{
    create_budget_plan_endpoint, delete_budget_plan_endpoint, get_budget_plan_endpoint,
    get_budget_plans_endpoint, unlink_expense_endpoint, update_budget_plan_amount_endpoint,
    update_budget_plan_endpoint,
};
