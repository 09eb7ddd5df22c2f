//! The HTTP handlers for the category catalog.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{
        Category, CategoryData, CategoryId,
        db::{
            create_category, delete_category, find_category, find_category_by_name,
            get_all_categories, update_category,
        },
    },
    db::lock_connection,
};

/// The state needed by the category handlers.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub name: Option<String>,
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Json(data): Json<CategoryData>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    create_category(data, &connection).map(|category| (StatusCode::CREATED, Json(category)))
}

/// A route handler for listing categories.
///
/// Responds with every category, or with the single category whose name
/// matches `?name=` exactly.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match query.name {
        Some(name) => find_category_by_name(&name, &connection)?
            .map(|category| Json(category).into_response())
            .ok_or(Error::CategoryNotFound),
        None => get_all_categories(&connection).map(|categories| Json(categories).into_response()),
    }
}

/// A route handler for getting a category by its database ID.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    find_category(category_id, &connection)?
        .map(Json)
        .ok_or(Error::CategoryNotFound)
}

/// A route handler for replacing the fields of a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
    Json(data): Json<CategoryData>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_category(category_id, data, &connection).map(Json)
}

/// A route handler for deleting a category that no expense uses.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_category(category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
