//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    auth::{AuthState, auth_guard},
    budget_plan::{
        create_budget_plan_endpoint, delete_budget_plan_endpoint, get_budget_plan_endpoint,
        get_budget_plans_endpoint, unlink_expense_endpoint, update_budget_plan_amount_endpoint,
        update_budget_plan_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, update_category_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expenses_endpoint,
        update_expense_endpoint,
    },
    logging::logging_middleware,
    user::{
        delete_user_endpoint, find_user_endpoint, log_in_endpoint, register_user_endpoint,
        update_password_endpoint, update_user_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Routes that act on behalf of a user sit behind [auth_guard], which rejects
/// requests without a valid bearer token before the handler runs.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::USERS,
            post(register_user_endpoint).get(find_user_endpoint),
        )
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::CATEGORY, get(get_category_endpoint));

    let protected_routes = Router::new()
        .route(endpoints::USER_PASSWORD, put(update_password_endpoint))
        .route(
            endpoints::USERS,
            put(update_user_endpoint).delete(delete_user_endpoint),
        )
        .route(endpoints::CATEGORIES, post(create_category_endpoint))
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            post(create_expense_endpoint).get(get_expenses_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .route(
            endpoints::BUDGET_PLANS,
            post(create_budget_plan_endpoint).get(get_budget_plans_endpoint),
        )
        .route(
            endpoints::BUDGET_PLAN_AMOUNT,
            put(update_budget_plan_amount_endpoint),
        )
        .route(
            endpoints::BUDGET_PLAN,
            get(get_budget_plan_endpoint)
                .put(update_budget_plan_endpoint)
                .delete(delete_budget_plan_endpoint),
        )
        .route(
            endpoints::BUDGET_PLAN_EXPENSE,
            delete(unlink_expense_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(
            AuthState::from_ref(&state),
            auth_guard,
        ));

    protected_routes
        .merge(unprotected_routes)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
