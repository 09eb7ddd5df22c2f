//! The user directory: registration, log-in and account management.

mod db;
mod directory;
mod domain;
mod endpoints;

pub use db::{create_user_table, get_user_by_email, get_user_by_id};
#[cfg(test)]
pub(crate) use db::insert_user;
pub use directory::{
    change_password, delete_user, get_acting_user, log_in, register_user, update_user,
};
pub use domain::{Email, NewUser, User, UserID};
pub use endpoints::{
    delete_user_endpoint, find_user_endpoint, log_in_endpoint, register_user_endpoint,
    update_password_endpoint, update_user_endpoint,
};
