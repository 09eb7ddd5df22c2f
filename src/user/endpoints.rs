//! The HTTP handlers for the user directory.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{Claims, TokenKeys},
    db::lock_connection,
    user::{
        Email, User,
        db::get_user_by_email,
        directory::{
            change_password, delete_user, get_acting_user, log_in, register_user, update_user,
        },
    },
};

/// The state needed by the user handlers.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys used to sign log-in tokens.
    pub token_keys: TokenKeys,
    /// The bcrypt cost for new password hashes.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserData {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LogInData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordData {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserData {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct FindUserQuery {
    pub email: String,
}

/// A route handler for registering a new user.
pub async fn register_user_endpoint(
    State(state): State<UserState>,
    Json(user_data): Json<RegisterUserData>,
) -> Result<(StatusCode, Json<User>), Error> {
    let email = Email::new(&user_data.email)?;
    let connection = lock_connection(&state.db_connection)?;

    register_user(
        &user_data.name,
        email,
        &user_data.password,
        state.password_hash_cost,
        &connection,
    )
    .map(|user| (StatusCode::CREATED, Json(user)))
}

/// A route handler for looking up a user by email, e.g. `GET /users?email=foo@bar.baz`.
pub async fn find_user_endpoint(
    State(state): State<UserState>,
    Query(query): Query<FindUserQuery>,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_user_by_email(query.email.trim(), &connection).map(Json)
}

/// A route handler for log-in requests.
///
/// Responds with `{"token": "<token>"}` on success and 401 otherwise.
pub async fn log_in_endpoint(
    State(state): State<UserState>,
    Json(user_data): Json<LogInData>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let token = log_in(
        &user_data.email,
        &user_data.password,
        &state.token_keys,
        &connection,
    )?;

    Ok(Json(json!({ "token": token })))
}

/// A route handler for changing the password of the logged in user.
pub async fn update_password_endpoint(
    State(state): State<UserState>,
    Extension(claims): Extension<Claims>,
    Json(password_data): Json<UpdatePasswordData>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    change_password(
        &user,
        &password_data.new_password,
        state.password_hash_cost,
        &connection,
    )?;

    tracing::info!("Changed password for user {}", user.id);

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for changing the name and email of the logged in user.
pub async fn update_user_endpoint(
    State(state): State<UserState>,
    Extension(claims): Extension<Claims>,
    Json(user_data): Json<UpdateUserData>,
) -> Result<Json<User>, Error> {
    let email = Email::new(&user_data.email)?;
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    update_user(user.id, &user_data.name, &email, &connection).map(Json)
}

/// A route handler for deleting the logged in user and everything they own.
pub async fn delete_user_endpoint(
    State(state): State<UserState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_acting_user(&claims, &connection)?;

    delete_user(user.id, &connection)?;

    tracing::info!("Deleted user {}", user.id);

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod user_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        auth::{TokenKeys, validate_token},
        endpoints,
        test_utils::{TEST_PASSWORD, get_test_server, register_and_log_in},
        user::Email,
    };

    #[tokio::test]
    async fn register_user_responds_with_created_user() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Foo", "email": "foo@bar.baz", "password": TEST_PASSWORD }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user = response.json::<Value>();
        assert_eq!(user["email"], "foo@bar.baz");
        assert_eq!(user["name"], "Foo");
        assert!(user.get("password_hash").is_none());
        assert!(user.get("password").is_none());
    }

    #[tokio::test]
    async fn register_user_with_taken_email_is_conflict() {
        let (server, _) = get_test_server();
        register_and_log_in(&server, "foo@bar.baz").await;

        server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Bar", "email": "foo@bar.baz", "password": TEST_PASSWORD }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_user_with_invalid_email_is_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({ "name": "Foo", "email": "foo", "password": TEST_PASSWORD }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "foo is not a valid email address"
        );
    }

    #[tokio::test]
    async fn find_user_by_email() {
        let (server, _) = get_test_server();
        register_and_log_in(&server, "foo@bar.baz").await;

        let response = server
            .get(endpoints::USERS)
            .add_query_param("email", "foo@bar.baz")
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["email"], "foo@bar.baz");

        server
            .get(endpoints::USERS)
            .add_query_param("email", "bar@baz.qux")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn log_in_returns_token_bound_to_email() {
        let (server, state) = get_test_server();

        let token = register_and_log_in(&server, "foo@bar.baz").await;

        let claims = validate_token(&token, &state.token_keys).unwrap();
        assert_eq!(claims.sub, Email::new_unchecked("foo@bar.baz"));
        assert!(validate_token(&token, &TokenKeys::new("not the key").unwrap()).is_err());
    }

    #[tokio::test]
    async fn log_in_with_wrong_password_is_unauthorized() {
        let (server, _) = get_test_server();
        register_and_log_in(&server, "foo@bar.baz").await;

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "foo@bar.baz", "password": "definitelyNotTheCorrectPassword" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn update_password_requires_token() {
        let (server, _) = get_test_server();

        server
            .put(endpoints::USER_PASSWORD)
            .json(&json!({ "new_password": "averystrongandsecurepassword" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn update_password_then_log_in_with_new_password() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;

        server
            .put(endpoints::USER_PASSWORD)
            .authorization_bearer(&token)
            .json(&json!({ "new_password": "averystrongandsecurepassword" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "foo@bar.baz", "password": "averystrongandsecurepassword" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn update_password_to_same_password_is_bad_request() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;

        server
            .put(endpoints::USER_PASSWORD)
            .authorization_bearer(&token)
            .json(&json!({ "new_password": TEST_PASSWORD }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_user_changes_profile() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;

        let response = server
            .put(endpoints::USERS)
            .authorization_bearer(&token)
            .json(&json!({ "name": "Bar", "email": "bar@baz.qux" }))
            .await;

        response.assert_status_ok();
        let user = response.json::<Value>();
        assert_eq!(user["name"], "Bar");
        assert_eq!(user["email"], "bar@baz.qux");
    }

    #[tokio::test]
    async fn delete_user_then_token_no_longer_resolves() {
        let (server, _) = get_test_server();
        let token = register_and_log_in(&server, "foo@bar.baz").await;

        server
            .delete(endpoints::USERS)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .delete(endpoints::USERS)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(endpoints::USERS)
            .add_query_param("email", "foo@bar.baz")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
