//! Database operations for the category catalog.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{Category, CategoryData, CategoryId, CategoryName},
    db::begin_write,
};

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT ''
        )",
        (),
    )?;

    Ok(())
}

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if a category with the same name exists.
pub fn create_category(data: CategoryData, connection: &Connection) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name, description, color) VALUES (?1, ?2, ?3)",
        (data.name.as_ref(), &data.description, &data.color),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: data.name,
        description: data.description,
        color: data.color,
    })
}

/// Retrieve a single category by ID, or `None` if there is no such category.
pub fn find_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, description, color FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve the category named exactly `name`, or `None` if there is no such category.
pub fn find_category_by_name(
    name: &str,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare("SELECT id, name, description, color FROM category WHERE name = :name")?
        .query_row(&[(":name", &name.trim())], map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, description, color FROM category ORDER BY name ASC")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Replace the name, description and color of a category.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist, or
/// [Error::DuplicateCategoryName] if the new name belongs to another category.
pub fn update_category(
    category_id: CategoryId,
    data: CategoryData,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, description = ?2, color = ?3 WHERE id = ?4",
        (data.name.as_ref(), &data.description, &data.color, category_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(Category {
        id: category_id,
        name: data.name,
        description: data.description,
        color: data.color,
    })
}

/// Delete a category by ID.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist and
/// [Error::CategoryInUse] if any expense still refers to it.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let transaction = begin_write(connection)?;

    if find_category(category_id, &transaction)?.is_none() {
        return Err(Error::CategoryNotFound);
    }

    let is_in_use: bool = transaction.query_row(
        "SELECT EXISTS (SELECT 1 FROM expense WHERE category_id = ?1)",
        [category_id],
        |row| row.get(0),
    )?;

    if is_in_use {
        return Err(Error::CategoryInUse);
    }

    transaction.execute("DELETE FROM category WHERE id = ?1", [category_id])?;
    transaction.commit()?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        description: row.get(2)?,
        color: row.get(3)?,
    })
}
