//! The category catalog for grouping expenses.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_category, create_category_table, delete_category, find_category,
    find_category_by_name, get_all_categories, update_category,
};
pub use domain::{Category, CategoryData, CategoryId, CategoryName};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    get_category_endpoint, update_category_endpoint,
};
