//! Community membership records and the admin-succession rules.
//!
//! Each (community, user) pair moves through a small state machine:
//! `None -> Member -> Admin` by joining and promotion, and back to `None`
//! when the user leaves. A community that still has members must keep at
//! least one admin, so the last admin leaving hands the role to the
//! earliest-joined remaining member, and whoever joins a community with no
//! admin goes straight to `Admin`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommunityId, UserId};

/// Governance role of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Admin,
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("ADMIN"),
            Self::Member => f.write_str("MEMBER"),
        }
    }
}

/// Active membership of a user in a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub community_id: CommunityId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub is_pending: bool,
}

impl Member {
    /// Whether this member currently governs the community.
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }

    /// Copy of the record stamped with the moment the user left.
    pub fn departed_at(mut self, left_at: DateTime<Utc>) -> Self {
        self.left_at = Some(left_at);
        self
    }
}

/// Membership row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub community_id: CommunityId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl NewMember {
    /// Materialise the stored record for this row.
    pub fn into_member(self) -> Member {
        Member {
            community_id: self.community_id,
            user_id: self.user_id,
            role: self.role,
            joined_at: self.joined_at,
            left_at: None,
            is_pending: false,
        }
    }
}

/// Membership state of one user in one community.
///
/// Leaving and promotion branch on this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipState {
    None,
    Member,
    Admin,
}

impl MembershipState {
    /// Derive the state from an optional active membership.
    pub fn of(member: Option<&Member>) -> Self {
        match member.map(|m| m.role) {
            None => Self::None,
            Some(MemberRole::Member) => Self::Member,
            Some(MemberRole::Admin) => Self::Admin,
        }
    }
}

/// What happens to a community once its last member has left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastMemberPolicy {
    /// Remove the community and its category links.
    Delete,
    /// Keep the community but stamp it as archived; it no longer accepts
    /// members and drops out of listings.
    Archive,
    /// Leave the empty community untouched.
    #[default]
    Retain,
}

impl fmt::Display for LastMemberPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => f.write_str("delete"),
            Self::Archive => f.write_str("archive"),
            Self::Retain => f.write_str("retain"),
        }
    }
}

/// Raised when text names no known [`LastMemberPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown last member policy {0:?}; expected delete, archive or retain")]
pub struct UnknownLastMemberPolicy(pub String);

impl FromStr for LastMemberPolicy {
    type Err = UnknownLastMemberPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "archive" => Ok(Self::Archive),
            "retain" => Ok(Self::Retain),
            _ => Err(UnknownLastMemberPolicy(s.to_owned())),
        }
    }
}

/// Pick the member who inherits the admin role from `departing`.
///
/// The earliest `joined_at` wins; identical timestamps fall back to user id
/// order so the choice never depends on storage order.
///
/// # Examples
/// ```
/// # use chrono::{Duration, Utc};
/// # use mealflow_backend::domain::*;
/// let community_id = CommunityId::random();
/// let start = Utc::now();
/// let member = |offset: i64, role| Member {
///     community_id,
///     user_id: UserId::random(),
///     role,
///     joined_at: start + Duration::days(offset),
///     left_at: None,
///     is_pending: false,
/// };
/// let admin = member(0, MemberRole::Admin);
/// let first = member(1, MemberRole::Member);
/// let second = member(2, MemberRole::Member);
/// let members = vec![second, admin.clone(), first.clone()];
///
/// let successor = select_successor(&members, &admin.user_id);
/// assert_eq!(successor, Some(&first));
/// ```
pub fn select_successor<'a>(members: &'a [Member], departing: &UserId) -> Option<&'a Member> {
    members
        .iter()
        .filter(|member| &member.user_id != departing)
        .min_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        })
}

#[cfg(test)]
mod tests;
