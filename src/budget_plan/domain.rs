//! Core budget plan domain types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    expense::{Expense, ExpenseId},
    user::UserID,
};

/// Database identifier for a budget plan.
pub type BudgetPlanId = i64;

/// A user's plan for a period or goal, with a running total and the expenses
/// linked to it.
///
/// `total_amount` is a ledger of its own. It only changes through explicit
/// add and subtract adjustments and is never recomputed from `expenses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPlan {
    /// The ID of the plan.
    pub id: BudgetPlanId,
    /// The display name, e.g. "March" or "Japan trip".
    pub name: String,
    /// The running total, changed only by add and subtract adjustments.
    pub total_amount: f64,
    /// Free text notes about the plan.
    pub description: String,
    /// When the plan was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// The user that owns the plan.
    pub user_id: UserID,
    /// The expenses linked to the plan, oldest first.
    pub expenses: Vec<Expense>,
}

/// The data for creating a budget plan.
///
/// A new plan starts with a total of zero and no expenses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBudgetPlan {
    /// The display name. Must not be blank.
    pub name: String,
    /// Free text notes about the plan.
    #[serde(default)]
    pub description: String,
}

/// The replacement name, description and expense set for a budget plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BudgetPlanUpdate {
    /// The new display name. Must not be blank.
    pub name: String,
    /// The new notes, replacing the old ones.
    #[serde(default)]
    pub description: String,
    /// The complete set of expenses the plan should be linked to afterwards.
    #[serde(default)]
    pub expense_ids: Vec<ExpenseId>,
}

/// An adjustment to the total amount of a budget plan.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AmountAdjustment {
    /// The ID of the plan to adjust.
    pub id: BudgetPlanId,
    /// How much to adjust the total by.
    pub amount: f64,
    /// Add `amount` to the total if `true`, otherwise subtract it.
    pub add: bool,
}

impl AmountAdjustment {
    /// The total after applying this adjustment to `total`.
    ///
    /// The result is not clamped, so subtracting more than the total gives a
    /// negative total.
    pub fn apply(&self, total: f64) -> f64 {
        if self.add {
            total + self.amount
        } else {
            total - self.amount
        }
    }
}
