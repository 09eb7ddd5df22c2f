//! The expense ledger.

mod db;
mod domain;
mod endpoints;
mod ledger;

pub use db::{create_expense_table, get_expense, get_expenses_by_plan};
pub(crate) use db::is_expense_owned_by;
pub use domain::{Expense, ExpenseId, ExpenseUpdate, NewExpense};
pub use endpoints::{
    create_expense_endpoint, delete_expense_endpoint, get_expenses_endpoint,
    update_expense_endpoint,
};
pub use ledger::{
    create_expense, delete_expense, get_category_expenses, get_plan_expenses, update_expense,
};
