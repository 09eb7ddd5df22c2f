//! Budget Planner is a JSON REST API for tracking personal spending.
//!
//! Users register and log in to receive a bearer token, sort their expenses
//! into shared categories and group them into budget plans that keep a running
//! total.
//!
//! The library provides the router and the domain operations behind it. The
//! `server` binary wires them to a SQLite database and serves the API.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod budget_plan;
mod category;
mod config;
mod db;
pub mod endpoints;
mod error;
mod expense;
mod logging;
mod password;
mod routing;
#[cfg(test)]
mod test_utils;
mod user;

pub use app_state::AppState;
pub use auth::{Claims, TOKEN_DURATION, TokenKeys, issue_token, validate_token};
pub use budget_plan::{
    AmountAdjustment, BudgetPlan, BudgetPlanId, BudgetPlanUpdate, NewBudgetPlan,
    create_budget_plan, delete_budget_plan, get_budget_plan, get_budget_plans_by_user,
    unlink_expense, update_budget_plan, update_budget_plan_amount,
};
pub use category::{
    Category, CategoryData, CategoryId, CategoryName, create_category, delete_category,
    find_category, find_category_by_name, get_all_categories, update_category,
};
pub use config::{Config, JWT_SECRET_VAR};
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorKind};
pub use expense::{
    Expense, ExpenseId, ExpenseUpdate, NewExpense, create_expense, delete_expense, get_expense,
    get_category_expenses, get_plan_expenses, update_expense,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{
    Email, User, UserID, change_password, delete_user, get_user_by_email, get_user_by_id, log_in,
    register_user, update_user,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
