//! Category taxonomy entries and the resolver for community category input.
//!
//! Clients send categories in three shapes: form-encoded requests carry a
//! JSON array string or a comma-separated string, JSON clients send a native
//! array. [`CategoryInput`] captures that union once at the boundary and
//! [`resolve_categories`] turns it into a canonical list of
//! [`CategoryName`]s. Existence against the taxonomy is checked later by the
//! community service, keeping the resolver pure.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use super::Error;

/// Name of a taxonomy category.
///
/// ## Invariants
/// - Non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Trim and validate a category name.
    ///
    /// # Examples
    /// ```
    /// use mealflow_backend::domain::CategoryName;
    ///
    /// let name = CategoryName::new("  Italian ").expect("valid name");
    /// assert_eq!(name.as_str(), "Italian");
    /// assert!(CategoryName::new("   ").is_none());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CategoryName> for String {
    fn from(value: CategoryName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CategoryName {
    type Error = CategoryParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or(CategoryParseError::EmptyEntry {
            input: value,
            position: 0,
        })
    }
}

/// Entry of the externally maintained category taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Taxonomy identifier.
    pub id: Uuid,
    /// Globally unique category name.
    pub name: CategoryName,
    /// Parent category for hierarchical taxonomies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

/// Raw category field of a community-creation request.
///
/// Deserialises untagged: `null` or a missing field becomes
/// [`CategoryInput::Absent`], an array becomes [`CategoryInput::List`] and a
/// string becomes [`CategoryInput::Text`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryInput {
    #[default]
    Absent,
    List(Vec<String>),
    Text(String),
}

impl From<Vec<String>> for CategoryInput {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&str> for CategoryInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Failure to interpret the category field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryParseError {
    /// The input looked like a JSON array but could not be decoded as one.
    #[error("categories must be a valid JSON array of strings: {reason}")]
    Malformed { input: String, reason: String },
    /// A list entry was blank after trimming.
    #[error("category entry {position} is blank")]
    EmptyEntry { input: String, position: usize },
}

impl From<CategoryParseError> for Error {
    fn from(value: CategoryParseError) -> Self {
        let details = match &value {
            CategoryParseError::Malformed { input, reason } => json!({
                "code": "malformed_categories",
                "input": input,
                "reason": reason,
            }),
            CategoryParseError::EmptyEntry { input, position } => json!({
                "code": "malformed_categories",
                "input": input,
                "position": position,
            }),
        };
        Error::invalid_request(
            "Categories must be a valid JSON array or comma-separated values",
        )
        .with_details(details)
    }
}

/// Resolve raw category input into a canonical, de-duplicated list.
///
/// Entries are trimmed and duplicates dropped, keeping the first occurrence,
/// so every accepted shape of the same categories yields the same list.
///
/// # Examples
/// ```
/// use mealflow_backend::domain::{CategoryInput, resolve_categories};
///
/// let from_json = resolve_categories(&CategoryInput::from(r#"["Italian", "Soup"]"#))?;
/// let from_csv = resolve_categories(&CategoryInput::from("Italian, Soup"))?;
/// assert_eq!(from_json, from_csv);
/// # Ok::<(), mealflow_backend::domain::CategoryParseError>(())
/// ```
pub fn resolve_categories(raw: &CategoryInput) -> Result<Vec<CategoryName>, CategoryParseError> {
    match raw {
        CategoryInput::Absent => Ok(Vec::new()),
        CategoryInput::List(entries) => canonicalise(entries.iter().map(String::as_str), || {
            entries.join(",")
        }),
        CategoryInput::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Vec::new());
            }
            if trimmed.starts_with('[') {
                let entries: Vec<String> =
                    serde_json::from_str(trimmed).map_err(|err| CategoryParseError::Malformed {
                        input: text.clone(),
                        reason: err.to_string(),
                    })?;
                return canonicalise(entries.iter().map(String::as_str), || text.clone());
            }
            canonicalise(trimmed.split(','), || text.clone())
        }
    }
}

fn canonicalise<'a>(
    entries: impl Iterator<Item = &'a str>,
    original: impl Fn() -> String,
) -> Result<Vec<CategoryName>, CategoryParseError> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for (position, entry) in entries.enumerate() {
        let name = CategoryName::new(entry).ok_or_else(|| CategoryParseError::EmptyEntry {
            input: original(),
            position,
        })?;
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }
    Ok(names)
}
