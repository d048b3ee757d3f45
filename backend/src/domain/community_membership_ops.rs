//! Membership state machine: joining, leaving and admin promotion.
//!
//! These run against an already open transaction so that succession, the
//! departing member's removal and any last-member policy all commit
//! together or not at all.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::domain::community_service_support::{community_not_found, map_repository_error};
use crate::domain::ports::{CommunityTransaction, LeaveCommunityResponse};
use crate::domain::{
    CommunityId, Error, LastMemberPolicy, Member, MemberRole, MembershipState, NewMember, UserId,
    select_successor,
};

/// Add `user_id` to the community.
///
/// The joiner is seated as admin when the community has no admin, which
/// happens once a retained community has emptied.
pub(crate) async fn join(
    tx: &mut dyn CommunityTransaction,
    community_id: CommunityId,
    user_id: &UserId,
    now: DateTime<Utc>,
) -> Result<Member, Error> {
    let community = tx
        .find_by_id(community_id)
        .await
        .map_err(map_repository_error)?
        .ok_or_else(|| community_not_found(community_id))?;
    if community.archived_at.is_some() {
        return Err(Error::conflict("Community is archived").with_details(json!({
            "communityId": community_id.to_string(),
        })));
    }

    let already_member = tx
        .is_member(community_id, user_id)
        .await
        .map_err(map_repository_error)?;
    if already_member {
        return Err(
            Error::conflict("User is already a member of this community").with_details(json!({
                "communityId": community_id.to_string(),
                "userId": user_id.to_string(),
            })),
        );
    }

    let headless = tx
        .get_admins(community_id)
        .await
        .map_err(map_repository_error)?
        .is_empty();
    let role = if headless {
        info!(
            community_id = %community_id,
            user_id = %user_id,
            "joiner takes over admin-less community"
        );
        MemberRole::Admin
    } else {
        MemberRole::Member
    };

    tx.add_member(&NewMember {
        community_id,
        user_id: user_id.clone(),
        role,
        joined_at: now,
    })
    .await
    .map_err(map_repository_error)
}

/// Remove `user_id` from the community.
///
/// A sole admin hands the role to the earliest-joined remaining member
/// first. When nobody is left afterwards, `policy` decides the community's
/// fate.
pub(crate) async fn leave(
    tx: &mut dyn CommunityTransaction,
    community_id: CommunityId,
    user_id: &UserId,
    now: DateTime<Utc>,
    policy: LastMemberPolicy,
) -> Result<LeaveCommunityResponse, Error> {
    let member = tx
        .find_member(community_id, user_id)
        .await
        .map_err(map_repository_error)?;

    let successor = match MembershipState::of(member.as_ref()) {
        MembershipState::None => {
            return Err(
                Error::not_found("User is not a member of this community").with_details(json!({
                    "communityId": community_id.to_string(),
                    "userId": user_id.to_string(),
                })),
            );
        }
        MembershipState::Member => None,
        MembershipState::Admin => hand_over_admin(tx, community_id, user_id).await?,
    };

    let removed = tx
        .remove_member(community_id, user_id)
        .await
        .map_err(map_repository_error)?;

    let remaining = tx
        .get_all_members(community_id)
        .await
        .map_err(map_repository_error)?;
    let applied_policy = if remaining.is_empty() {
        apply_last_member_policy(tx, community_id, policy, now).await?;
        Some(policy)
    } else {
        None
    };

    Ok(LeaveCommunityResponse {
        departed: removed.departed_at(now),
        successor,
        applied_policy,
    })
}

async fn hand_over_admin(
    tx: &mut dyn CommunityTransaction,
    community_id: CommunityId,
    departing: &UserId,
) -> Result<Option<Member>, Error> {
    let admins = tx
        .get_admins(community_id)
        .await
        .map_err(map_repository_error)?;
    if admins.len() > 1 {
        return Ok(None);
    }

    let members = tx
        .get_members_sorted_by_join_date(community_id)
        .await
        .map_err(map_repository_error)?;
    let Some(next) = select_successor(&members, departing) else {
        return Ok(None);
    };
    let next_id = next.user_id.clone();

    let promoted = promote(tx, community_id, departing, &[next_id]).await?;
    let successor = promoted.into_iter().next();
    if let Some(successor) = &successor {
        info!(
            community_id = %community_id,
            departing_admin = %departing,
            successor = %successor.user_id,
            "admin role handed to earliest remaining member"
        );
    }
    Ok(successor)
}

async fn apply_last_member_policy(
    tx: &mut dyn CommunityTransaction,
    community_id: CommunityId,
    policy: LastMemberPolicy,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    match policy {
        LastMemberPolicy::Delete => tx
            .delete_community(community_id)
            .await
            .map_err(map_repository_error)?,
        LastMemberPolicy::Archive => tx
            .archive_community(community_id, now)
            .await
            .map_err(map_repository_error)?,
        LastMemberPolicy::Retain => {}
    }
    info!(community_id = %community_id, %policy, "last member left community");
    Ok(())
}

/// Promote `member_ids` to admin on behalf of `requested_by`.
///
/// Shared by explicit promotion and by succession; in the latter case the
/// departing admin is still a member when this runs.
pub(crate) async fn promote(
    tx: &mut dyn CommunityTransaction,
    community_id: CommunityId,
    requested_by: &UserId,
    member_ids: &[UserId],
) -> Result<Vec<Member>, Error> {
    if member_ids.is_empty() {
        return Err(Error::invalid_request("memberIds must not be empty")
            .with_details(json!({ "field": "memberIds" })));
    }

    let requester = tx
        .find_member(community_id, requested_by)
        .await
        .map_err(map_repository_error)?;
    if MembershipState::of(requester.as_ref()) != MembershipState::Admin {
        return Err(
            Error::forbidden("Only community admins can promote members").with_details(json!({
                "communityId": community_id.to_string(),
                "userId": requested_by.to_string(),
            })),
        );
    }

    let mut seen = HashSet::new();
    let targets: Vec<UserId> = member_ids
        .iter()
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect();

    let members = tx
        .get_all_members(community_id)
        .await
        .map_err(map_repository_error)?;
    let current: HashSet<&UserId> = members.iter().map(|member| &member.user_id).collect();
    let unknown: Vec<String> = targets
        .iter()
        .filter(|id| !current.contains(id))
        .map(ToString::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(Error::invalid_request(format!(
            "Not members of this community: {}",
            unknown.join(", ")
        ))
        .with_details(json!({ "unknownMemberIds": unknown })));
    }

    tx.make_admins(community_id, &targets)
        .await
        .map_err(map_repository_error)
}
