//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/category/{category_id}', use [format_endpoint].

/// The route to register, look up, update and delete users.
pub const USERS: &str = "/users";
/// The route for logging in a user.
pub const LOG_IN: &str = "/users/login";
/// The route for changing the password of the current user.
pub const USER_PASSWORD: &str = "/users/password";
/// The route to create and list categories.
pub const CATEGORIES: &str = "/category";
/// The route to access a single category.
pub const CATEGORY: &str = "/category/{category_id}";
/// The route to create and query expenses.
pub const EXPENSES: &str = "/expense";
/// The route to update and delete a single expense.
pub const EXPENSE: &str = "/expense/{expense_id}";
/// The route to create and list the current user's budget plans.
pub const BUDGET_PLANS: &str = "/plan";
/// The route to adjust the total amount of a budget plan.
pub const BUDGET_PLAN_AMOUNT: &str = "/plan/amount";
/// The route to access a single budget plan.
pub const BUDGET_PLAN: &str = "/plan/{plan_id}";
/// The route to unlink an expense from a budget plan.
pub const BUDGET_PLAN_EXPENSE: &str = "/plan/{plan_id}/expense/{expense_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// Only the first parameter is replaced, call it again for paths with more
/// than one parameter.
///
/// ```
/// use budget_planner::endpoints::format_endpoint;
///
/// assert_eq!(format_endpoint("/plan/{plan_id}", 1), "/plan/1");
/// assert_eq!(
///     format_endpoint(&format_endpoint("/plan/{plan_id}/expense/{expense_id}", 1), 2),
///     "/plan/1/expense/2"
/// );
/// ```
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let (Some(param_start), Some(param_end)) = (endpoint_path.find('{'), endpoint_path.find('}'))
    else {
        return endpoint_path.to_owned();
    };

    if param_end < param_start {
        return endpoint_path.to_owned();
    }

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end + 1..]
    )
}
