//! Helpers shared by the endpoint tests.

use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{AppState, auth::TokenKeys, build_router, endpoints};

/// A password that passes the strength check.
pub(crate) const TEST_PASSWORD: &str = "turkeysgogobblegobble";

pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, TokenKeys::new("foobar").expect("Could not create token keys"))
        .expect("Could not create app state")
        .with_password_hash_cost(4)
}

pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let state = get_test_app_state();
    let server = TestServer::new(build_router(state.clone()));

    (server, state)
}

/// Register a user with `email` and [TEST_PASSWORD], log in and return the token.
pub(crate) async fn register_and_log_in(server: &TestServer, email: &str) -> String {
    server
        .post(endpoints::USERS)
        .json(&json!({ "name": "Test User", "email": email, "password": TEST_PASSWORD }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["token"]
        .as_str()
        .expect("log-in response did not contain a token")
        .to_owned()
}
