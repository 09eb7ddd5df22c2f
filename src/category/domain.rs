//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
///
/// Names are trimmed but otherwise compared exactly, so "Food" and "food" are
/// two different categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CategoryName::new(&value)
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named group for expenses, e.g. 'Groceries' or 'Rent'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The unique name of the category.
    pub name: CategoryName,
    /// What belongs in the category.
    pub description: String,
    /// A display color chosen by the client, e.g. "#ff8800".
    pub color: String,
}

/// The fields of a category that the client provides, used for creating and
/// updating categories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryData {
    /// The unique name of the category.
    pub name: CategoryName,
    /// What belongs in the category.
    #[serde(default)]
    pub description: String,
    /// A display color chosen by the client.
    #[serde(default)]
    pub color: String,
}
