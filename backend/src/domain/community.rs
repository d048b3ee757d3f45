//! Community aggregate, its value objects and response formatting.
//!
//! A community is created by a user (its immutable owner), links to zero or
//! more taxonomy categories and holds one or more members. Persistence
//! returns the raw [`CommunityRecord`] shape, in which categories are wrapped
//! in join rows; [`Community`] is the flattened form handed to callers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::{Category, CategoryInput, Error, Member, NewMember, UserId};

/// Minimum allowed length for a community name.
pub const COMMUNITY_NAME_MIN: usize = 3;
/// Maximum allowed length for a community name.
pub const COMMUNITY_NAME_MAX: usize = 50;
/// Maximum allowed length for a community description.
pub const COMMUNITY_DESCRIPTION_MAX: usize = 500;

/// Validation errors raised while building community values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommunityValidationError {
    EmptyId,
    InvalidId,
    NameTooShort { min: usize },
    NameTooLong { max: usize },
    DescriptionTooLong { max: usize },
    InvalidImageUri { value: String },
}

impl CommunityValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "communityId",
            Self::NameTooShort { .. } | Self::NameTooLong { .. } => "name",
            Self::DescriptionTooLong { .. } => "description",
            Self::InvalidImageUri { .. } => "image",
        }
    }
}

impl fmt::Display for CommunityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "community id must not be empty"),
            Self::InvalidId => write!(f, "community id must be a valid UUID"),
            Self::NameTooShort { min } => {
                write!(f, "community name must be at least {min} characters")
            }
            Self::NameTooLong { max } => {
                write!(f, "community name must be at most {max} characters")
            }
            Self::DescriptionTooLong { max } => {
                write!(f, "community description must be at most {max} characters")
            }
            Self::InvalidImageUri { value } => {
                write!(f, "community image must be an http(s) URI, got {value:?}")
            }
        }
    }
}

impl std::error::Error for CommunityValidationError {}

impl From<CommunityValidationError> for Error {
    fn from(value: CommunityValidationError) -> Self {
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": "invalid_community",
        }))
    }
}

/// Stable community identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityId(Uuid);

impl CommunityId {
    /// Parse a community identifier supplied by a caller.
    ///
    /// # Examples
    /// ```
    /// use mealflow_backend::domain::{CommunityId, CommunityValidationError};
    ///
    /// assert_eq!(CommunityId::new(""), Err(CommunityValidationError::EmptyId));
    /// assert!(CommunityId::new("7c9e6679-7425-40de-944b-e07fc1f90ae7").is_ok());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CommunityValidationError> {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            return Err(CommunityValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| CommunityValidationError::InvalidId)
    }

    /// Generate a fresh identifier for a new community.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique, human readable community name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommunityName(String);

impl CommunityName {
    /// Trim and validate a community name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CommunityValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if length < COMMUNITY_NAME_MIN {
            return Err(CommunityValidationError::NameTooShort {
                min: COMMUNITY_NAME_MIN,
            });
        }
        if length > COMMUNITY_NAME_MAX {
            return Err(CommunityValidationError::NameTooLong {
                max: COMMUNITY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CommunityName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommunityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CommunityName> for String {
    fn from(value: CommunityName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommunityName {
    type Error = CommunityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Who may discover and read a community.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Privacy {
    #[default]
    Public,
    Private,
}

/// Who may publish recipes inside a community.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeCreationPermission {
    #[default]
    AnyMember,
    AdminOnly,
}

/// Inbound request to create a community.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub recipe_creation_permission: Option<RecipeCreationPermission>,
    #[serde(default)]
    pub privacy: Option<Privacy>,
    #[serde(default)]
    pub categories: CategoryInput,
}

impl CommunityDraft {
    /// Start a draft with only a name; remaining fields take defaults.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the raw category input.
    pub fn with_categories(mut self, categories: impl Into<CategoryInput>) -> Self {
        self.categories = categories.into();
        self
    }
}

/// Validate an optional description, treating blank text as absent.
pub fn validate_description(
    raw: Option<&str>,
) -> Result<Option<String>, CommunityValidationError> {
    let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > COMMUNITY_DESCRIPTION_MAX {
        return Err(CommunityValidationError::DescriptionTooLong {
            max: COMMUNITY_DESCRIPTION_MAX,
        });
    }
    Ok(Some(text.to_owned()))
}

/// Validate an optional image location; only absolute http(s) URIs pass.
pub fn validate_image(raw: Option<&str>) -> Result<Option<String>, CommunityValidationError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    let invalid = || CommunityValidationError::InvalidImageUri {
        value: value.to_owned(),
    };
    let parsed = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(Some(value.to_owned()))
}

/// Fully validated community ready to be persisted in one write.
///
/// The owner's `ADMIN` membership and the category links are part of the
/// same record so adapters can create all three atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommunity {
    pub id: CommunityId,
    pub name: CommunityName,
    pub description: Option<String>,
    pub image: Option<String>,
    pub privacy: Privacy,
    pub recipe_creation_permission: RecipeCreationPermission,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub owner_membership: NewMember,
    pub categories: Vec<Category>,
}

/// Join row linking a community to a taxonomy category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityCategoryLink {
    pub category: Category,
}

/// Community as stored, with categories still wrapped in join rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityRecord {
    pub id: CommunityId,
    pub name: CommunityName,
    pub description: Option<String>,
    pub image: Option<String>,
    pub privacy: Privacy,
    pub recipe_creation_permission: RecipeCreationPermission,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    pub categories: Vec<CommunityCategoryLink>,
    pub members: Vec<Member>,
}

/// Community as returned to callers.
///
/// # Examples
/// ```
/// # use chrono::Utc;
/// # use mealflow_backend::domain::*;
/// # use uuid::Uuid;
/// let category = Category {
///     id: Uuid::new_v4(),
///     name: CategoryName::new("Italian").expect("valid"),
///     parent_id: None,
/// };
/// let record = CommunityRecord {
///     id: CommunityId::random(),
///     name: CommunityName::new("Soup Club").expect("valid"),
///     description: None,
///     image: None,
///     privacy: Privacy::Public,
///     recipe_creation_permission: RecipeCreationPermission::AnyMember,
///     owner_id: UserId::random(),
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
///     archived_at: None,
///     categories: vec![CommunityCategoryLink { category: category.clone() }],
///     members: Vec::new(),
/// };
///
/// let community = Community::from(record);
/// assert_eq!(community.categories, vec![category]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: CommunityId,
    pub name: CommunityName,
    pub description: Option<String>,
    pub image: Option<String>,
    pub privacy: Privacy,
    pub recipe_creation_permission: RecipeCreationPermission,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    pub categories: Vec<Category>,
    pub members: Vec<Member>,
    pub member_count: usize,
}

impl From<CommunityRecord> for Community {
    fn from(record: CommunityRecord) -> Self {
        let CommunityRecord {
            id,
            name,
            description,
            image,
            privacy,
            recipe_creation_permission,
            owner_id,
            created_at,
            updated_at,
            archived_at,
            categories,
            members,
        } = record;

        Self {
            id,
            name,
            description,
            image,
            privacy,
            recipe_creation_permission,
            owner_id,
            created_at,
            updated_at,
            archived_at,
            categories: categories.into_iter().map(|link| link.category).collect(),
            member_count: members.len(),
            members,
        }
    }
}

#[cfg(test)]
mod tests;
