//! The HTTP handlers for budget plans.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Claims,
    budget_plan::{
        AmountAdjustment, BudgetPlan, BudgetPlanId, BudgetPlanUpdate, NewBudgetPlan,
        aggregator::{
            create_budget_plan, delete_budget_plan, get_budget_plan, get_budget_plans_by_user,
            unlink_expense, update_budget_plan, update_budget_plan_amount,
        },
    },
    db::lock_connection,
    expense::ExpenseId,
    user::get_acting_user,
};

/// The state needed by the budget plan handlers.
#[derive(Debug, Clone)]
pub struct BudgetPlanState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetPlanState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a plan owned by the logged in user.
pub async fn create_budget_plan_endpoint(
    State(state): State<BudgetPlanState>,
    Extension(claims): Extension<Claims>,
    Json(new_plan): Json<NewBudgetPlan>,
) -> Result<(StatusCode, Json<BudgetPlan>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    create_budget_plan(new_plan, &claims.sub, &connection)
        .map(|plan| (StatusCode::CREATED, Json(plan)))
}

/// A route handler for listing the logged in user's plans with their expenses.
pub async fn get_budget_plans_endpoint(
    State(state): State<BudgetPlanState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<BudgetPlan>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    get_budget_plans_by_user(user.id, &connection).map(Json)
}

/// A route handler for getting one of the logged in user's plans.
///
/// Plans owned by other users get a 404 so that their existence is not revealed.
pub async fn get_budget_plan_endpoint(
    State(state): State<BudgetPlanState>,
    Extension(claims): Extension<Claims>,
    Path(plan_id): Path<BudgetPlanId>,
) -> Result<Json<BudgetPlan>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    get_budget_plan(plan_id, user.id, &connection).map(Json)
}

/// A route handler for replacing the name, description and expenses of a plan.
pub async fn update_budget_plan_endpoint(
    State(state): State<BudgetPlanState>,
    Extension(claims): Extension<Claims>,
    Path(plan_id): Path<BudgetPlanId>,
    Json(update): Json<BudgetPlanUpdate>,
) -> Result<Json<BudgetPlan>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    update_budget_plan(plan_id, update, user.id, &connection).map(Json)
}

/// A route handler for adding to or subtracting from the total of a plan.
///
/// The body is `{"id": <plan id>, "amount": <amount>, "add": <bool>}`.
pub async fn update_budget_plan_amount_endpoint(
    State(state): State<BudgetPlanState>,
    Extension(claims): Extension<Claims>,
    Json(adjustment): Json<AmountAdjustment>,
) -> Result<Json<BudgetPlan>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    update_budget_plan_amount(adjustment, user.id, &connection).map(Json)
}

/// A route handler for deleting a plan. Its expenses are kept.
pub async fn delete_budget_plan_endpoint(
    State(state): State<BudgetPlanState>,
    Extension(claims): Extension<Claims>,
    Path(plan_id): Path<BudgetPlanId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    delete_budget_plan(plan_id, user.id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for unlinking an expense from a plan.
pub async fn unlink_expense_endpoint(
    State(state): State<BudgetPlanState>,
    Extension(claims): Extension<Claims>,
    Path((plan_id, expense_id)): Path<(BudgetPlanId, ExpenseId)>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    unlink_expense(plan_id, expense_id, user.id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod budget_plan_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, register_and_log_in},
    };

    async fn create_plan(server: &TestServer, token: &str, name: &str) -> Value {
        let response = server
            .post(endpoints::BUDGET_PLANS)
            .authorization_bearer(token)
            .json(&json!({ "name": name, "description": "Spending money" }))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Value>()
    }

    async fn create_expense(server: &TestServer, token: &str, plan_id: i64) -> i64 {
        let category_id = match server
            .get(endpoints::CATEGORIES)
            .add_query_param("name", "Food")
            .await
            .json::<Value>()["id"]
            .as_i64()
        {
            Some(id) => id,
            None => server
                .post(endpoints::CATEGORIES)
                .authorization_bearer(token)
                .json(&json!({ "name": "Food" }))
                .await
                .json::<Value>()["id"]
                .as_i64()
                .unwrap(),
        };

        server
            .post(endpoints::EXPENSES)
            .authorization_bearer(token)
            .json(&json!({
                "amount": 10.0,
                "category_id": category_id,
                "date": "2025-03-14",
                "budget_plan_id": plan_id,
            }))
            .await
            .json::<Value>()["id"]
            .as_i64()
            .unwrap()
    }

    #[tokio::test]
    async fn plan_routes_require_token() {
        let (server, _) = get_test_server();

        server
            .get(endpoints::BUDGET_PLANS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .put(endpoints::BUDGET_PLAN_AMOUNT)
            .json(&json!({ "id": 1, "amount": 5.0, "add": true }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_plan_starts_at_zero_and_is_listed() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;

        let plan = create_plan(&server, &token, "March").await;

        assert_eq!(plan["total_amount"], 0.0);
        assert_eq!(plan["expenses"], json!([]));
        server
            .get(endpoints::BUDGET_PLANS)
            .authorization_bearer(&token)
            .await
            .assert_json(&json!([plan]));
    }

    #[tokio::test]
    async fn adjust_amount_add_then_subtract() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;
        let plan_id = create_plan(&server, &token, "March").await["id"]
            .as_i64()
            .unwrap();

        server
            .put(endpoints::BUDGET_PLAN_AMOUNT)
            .authorization_bearer(&token)
            .json(&json!({ "id": plan_id, "amount": 50.0, "add": true }))
            .await
            .assert_status_ok();
        let response = server
            .put(endpoints::BUDGET_PLAN_AMOUNT)
            .authorization_bearer(&token)
            .json(&json!({ "id": plan_id, "amount": 20.0, "add": false }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["total_amount"], 30.0);
    }

    #[tokio::test]
    async fn plan_of_other_user_is_not_found() {
        let (server, _) = get_test_server();
        let owner_token = register_and_log_in(&server, "foo@bar.baz").await;
        let other_token = register_and_log_in(&server, "bar@baz.qux").await;
        let plan_id = create_plan(&server, &owner_token, "March").await["id"]
            .as_i64()
            .unwrap();
        let path = format_endpoint(endpoints::BUDGET_PLAN, plan_id);

        server
            .get(&path)
            .authorization_bearer(&other_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&path)
            .authorization_bearer(&other_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .put(endpoints::BUDGET_PLAN_AMOUNT)
            .authorization_bearer(&other_token)
            .json(&json!({ "id": plan_id, "amount": 5.0, "add": true }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&path)
            .authorization_bearer(&owner_token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn update_plan_replaces_expenses() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;
        let plan_id = create_plan(&server, &token, "March").await["id"]
            .as_i64()
            .unwrap();
        create_expense(&server, &token, plan_id).await;
        let second = create_expense(&server, &token, plan_id).await;

        let response = server
            .put(&format_endpoint(endpoints::BUDGET_PLAN, plan_id))
            .authorization_bearer(&token)
            .json(&json!({ "name": "April", "expense_ids": [second] }))
            .await;

        response.assert_status_ok();
        let plan = response.json::<Value>();
        assert_eq!(plan["name"], "April");
        let expense_ids: Vec<i64> = plan["expenses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|expense| expense["id"].as_i64().unwrap())
            .collect();
        assert_eq!(expense_ids, vec![second]);
    }

    #[tokio::test]
    async fn update_plan_with_expense_of_other_user_is_not_found() {
        let (server, _) = get_test_server();
        let owner_token = register_and_log_in(&server, "foo@bar.baz").await;
        let other_token = register_and_log_in(&server, "bar@baz.qux").await;
        let owner_plan_id = create_plan(&server, &owner_token, "March").await["id"]
            .as_i64()
            .unwrap();
        let expense_id = create_expense(&server, &owner_token, owner_plan_id).await;
        let other_plan_id = create_plan(&server, &other_token, "Mine").await["id"]
            .as_i64()
            .unwrap();

        server
            .put(&format_endpoint(endpoints::BUDGET_PLAN, other_plan_id))
            .authorization_bearer(&other_token)
            .json(&json!({ "name": "Mine", "expense_ids": [expense_id] }))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let owner_plan = server
            .get(&format_endpoint(endpoints::BUDGET_PLAN, owner_plan_id))
            .authorization_bearer(&owner_token)
            .await
            .json::<Value>();
        assert_eq!(owner_plan["expenses"][0]["id"], expense_id);
    }

    #[tokio::test]
    async fn unlink_expense_from_plan() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;
        let plan_id = create_plan(&server, &token, "March").await["id"]
            .as_i64()
            .unwrap();
        let expense_id = create_expense(&server, &token, plan_id).await;
        let path = format_endpoint(
            &format_endpoint(endpoints::BUDGET_PLAN_EXPENSE, plan_id),
            expense_id,
        );

        server
            .delete(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_plan_then_get_is_not_found() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;
        let plan_id = create_plan(&server, &token, "March").await["id"]
            .as_i64()
            .unwrap();
        create_expense(&server, &token, plan_id).await;
        create_expense(&server, &token, plan_id).await;
        let path = format_endpoint(endpoints::BUDGET_PLAN, plan_id);

        server
            .delete(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
