//! The HTTP handlers for the expense ledger.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    budget_plan::BudgetPlanId,
    category::CategoryId,
    db::lock_connection,
    expense::{
        Expense, ExpenseId, ExpenseUpdate, NewExpense,
        ledger::{
            create_expense, delete_expense, get_category_expenses, get_plan_expenses,
            update_expense,
        },
    },
    user::get_acting_user,
};

/// The state needed by the expense handlers.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Filters for listing expenses. Exactly one must be given.
#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    /// List the expenses linked to this plan.
    pub plan_id: Option<BudgetPlanId>,
    /// List the acting user's expenses in this category.
    pub category_id: Option<CategoryId>,
}

/// The plan an expense is deleted through.
#[derive(Debug, Deserialize)]
pub struct DeleteExpenseQuery {
    pub plan_id: BudgetPlanId,
}

/// A route handler for recording a new expense against one of the user's plans.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(claims): Extension<Claims>,
    Json(new_expense): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    create_expense(new_expense, user.id, &connection)
        .map(|expense| (StatusCode::CREATED, Json(expense)))
}

/// A route handler for listing expenses by plan (`?plan_id=`) or by category (`?category_id=`).
pub async fn get_expenses_endpoint(
    State(state): State<ExpenseState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    match (query.plan_id, query.category_id) {
        (Some(plan_id), None) => get_plan_expenses(plan_id, user.id, &connection).map(Json),
        (None, Some(category_id)) => {
            get_category_expenses(category_id, user.id, &connection).map(Json)
        }
        _ => Err(Error::InvalidQuery(
            "specify exactly one of plan_id or category_id".to_owned(),
        )),
    }
}

/// A route handler for changing an expense.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(claims): Extension<Claims>,
    Path(expense_id): Path<ExpenseId>,
    Json(update): Json<ExpenseUpdate>,
) -> Result<Json<Expense>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    update_expense(expense_id, update, user.id, &connection).map(Json)
}

/// A route handler for deleting an expense, e.g. `DELETE /expense/3?plan_id=1`.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(claims): Extension<Claims>,
    Path(expense_id): Path<ExpenseId>,
    Query(query): Query<DeleteExpenseQuery>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    delete_expense(expense_id, query.plan_id, user.id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod expense_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, register_and_log_in},
    };

    /// Create a category and a plan, returning their IDs.
    async fn create_category_and_plan(server: &TestServer, token: &str) -> (i64, i64) {
        let category_id = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(token)
            .json(&json!({ "name": "Food" }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap();
        let plan_id = server
            .post(endpoints::BUDGET_PLANS)
            .authorization_bearer(token)
            .json(&json!({ "name": "March" }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap();

        (category_id, plan_id)
    }

    #[tokio::test]
    async fn create_expense_requires_token() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "amount": 12.5,
                "category_id": 1,
                "date": "2025-03-14",
                "budget_plan_id": 1,
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_and_list_expense_by_plan_and_category() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;
        let (category_id, plan_id) = create_category_and_plan(&server, &token).await;

        let response = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .json(&json!({
                "amount": 12.5,
                "description": "Lunch",
                "category_id": category_id,
                "date": "2025-03-14",
                "budget_plan_id": plan_id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let expense = response.json::<Value>();
        assert_eq!(expense["date"], "2025-03-14");

        let by_plan = server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .add_query_param("plan_id", plan_id)
            .await;
        by_plan.assert_status_ok();
        assert_eq!(by_plan.json::<Value>(), json!([expense]));

        let by_category = server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .add_query_param("category_id", category_id)
            .await;
        by_category.assert_status_ok();
        assert_eq!(by_category.json::<Value>(), json!([expense]));
    }

    #[tokio::test]
    async fn create_expense_for_missing_plan_is_not_found() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;
        let (category_id, _) = create_category_and_plan(&server, &token).await;

        server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .json(&json!({
                "amount": 12.5,
                "category_id": category_id,
                "date": "2025-03-14",
                "budget_plan_id": 999,
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_expenses_without_filter_is_bad_request() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;

        server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_then_delete_expense() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;
        let (category_id, plan_id) = create_category_and_plan(&server, &token).await;
        let expense_id = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .json(&json!({
                "amount": 12.5,
                "category_id": category_id,
                "date": "2025-03-14",
                "budget_plan_id": plan_id,
            }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap();
        let path = format_endpoint(endpoints::EXPENSE, expense_id);

        let response = server
            .put(&path)
            .authorization_bearer(&token)
            .json(&json!({
                "amount": 15.0,
                "description": "Dinner",
                "date": "2025-03-15",
                "is_recurring": true,
            }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["amount"], 15.0);

        server
            .delete(&path)
            .authorization_bearer(&token)
            .add_query_param("plan_id", plan_id)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&token)
            .add_query_param("plan_id", plan_id)
            .await
            .assert_json(&json!([]));
    }

    #[tokio::test]
    async fn expenses_of_other_users_are_hidden() {
        let (server, _) = get_test_server();
        let owner_token = register_and_log_in(&server, "foo@bar.baz").await;
        let other_token = register_and_log_in(&server, "bar@baz.qux").await;
        let (category_id, plan_id) = create_category_and_plan(&server, &owner_token).await;
        let expense_id = server
            .post(endpoints::EXPENSES)
            .authorization_bearer(&owner_token)
            .json(&json!({
                "amount": 12.5,
                "category_id": category_id,
                "date": "2025-03-14",
                "budget_plan_id": plan_id,
            }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap();

        server
            .get(endpoints::EXPENSES)
            .authorization_bearer(&other_token)
            .add_query_param("plan_id", plan_id)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format_endpoint(endpoints::EXPENSE, expense_id))
            .authorization_bearer(&other_token)
            .add_query_param("plan_id", plan_id)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
