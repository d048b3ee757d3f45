//! Driving port for community and membership mutations.
//!
//! Identifiers arrive as raw strings from the authenticated request context
//! so that missing or malformed ids are rejected by the service with the
//! same `invalid_request` error as any other bad input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Community, CommunityDraft, Error, LastMemberPolicy, Member};

/// Request to create a community owned by `actor_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    pub actor_id: String,
    pub draft: CommunityDraft,
}

/// A (community, user) pair targeted by a join or leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub community_id: String,
    pub user_id: String,
}

impl MembershipRequest {
    pub fn new(community_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            community_id: community_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Outcome of a departure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveCommunityResponse {
    /// The removed membership, stamped with `left_at`.
    pub departed: Member,
    /// Member promoted to admin because the departing user was the sole
    /// admin.
    pub successor: Option<Member>,
    /// Policy applied because the community became empty.
    pub applied_policy: Option<LastMemberPolicy>,
}

/// Request by `requested_by` to promote `member_ids` to admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminsRequest {
    pub community_id: String,
    pub requested_by: String,
    pub member_ids: Vec<String>,
}

/// Request by `actor_id` to delete a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommunityRequest {
    pub community_id: String,
    pub actor_id: String,
}

/// Driving port for community write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityCommand: Send + Sync {
    /// Create a community with the actor as its owner and first admin.
    ///
    /// Fails with `conflict` when the name is taken and `invalid_request`
    /// when any category is unknown; nothing is persisted on failure.
    async fn create_community(&self, request: CreateCommunityRequest) -> Result<Community, Error>;

    /// Add the user to the community as a plain member.
    async fn join_community(&self, request: MembershipRequest) -> Result<Member, Error>;

    /// Remove the user's membership, handing the admin role on when the
    /// user was the sole admin.
    async fn leave_community(
        &self,
        request: MembershipRequest,
    ) -> Result<LeaveCommunityResponse, Error>;

    /// Promote members to admin; only current admins may do so.
    async fn set_admins(&self, request: SetAdminsRequest) -> Result<Vec<Member>, Error>;

    /// Delete a community; only its owner may do so.
    async fn delete_community(&self, request: DeleteCommunityRequest) -> Result<(), Error>;
}
