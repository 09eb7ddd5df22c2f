//! Core expense domain types.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{budget_plan::BudgetPlanId, category::CategoryId};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// Money spent on something, filed under a category and linked to budget plans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount of money spent, in dollars.
    pub amount: f64,
    /// A text description of what the money was spent on.
    pub description: String,
    /// The ID of the category the expense is filed under.
    pub category_id: CategoryId,
    /// When the money was spent.
    pub date: Date,
    /// Whether the expense repeats, e.g. rent or a subscription.
    pub is_recurring: bool,
    /// The plan the expense was created against.
    ///
    /// This is `None` once that plan has been deleted.
    pub budget_plan_id: Option<BudgetPlanId>,
}

/// The data for recording a new expense against a budget plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewExpense {
    /// The amount of money spent, in dollars.
    pub amount: f64,
    /// A text description of what the money was spent on.
    #[serde(default)]
    pub description: String,
    /// The category to file the expense under. It must exist.
    pub category_id: CategoryId,
    /// When the money was spent, e.g. "2025-03-14".
    pub date: Date,
    /// Whether the expense repeats.
    #[serde(default)]
    pub is_recurring: bool,
    /// The plan to link the expense to. It must be owned by the acting user.
    pub budget_plan_id: BudgetPlanId,
}

/// The fields of an expense that may change after it is recorded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpenseUpdate {
    /// The new amount, in dollars.
    pub amount: f64,
    /// The new description.
    #[serde(default)]
    pub description: String,
    /// The new date.
    pub date: Date,
    /// Whether the expense repeats.
    #[serde(default)]
    pub is_recurring: bool,
}
