//! Transaction over the in-memory community state.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::domain::ports::{CommunityRepositoryError, CommunityTransaction};
use crate::domain::{
    CommunityCategoryLink, CommunityFilter, CommunityId, CommunityName, CommunityRecord,
    CommunitySortKey, Member, MemberRole, NewCommunity, NewMember, Page, PageRequest, SortOrder,
    UserId,
};

use super::StoreState;

pub(super) struct InMemoryTransaction {
    committed: OwnedMutexGuard<StoreState>,
    working: StoreState,
}

impl InMemoryTransaction {
    pub(super) fn new(committed: OwnedMutexGuard<StoreState>) -> Self {
        let working = committed.clone();
        Self { committed, working }
    }

    fn community(&self, id: CommunityId) -> Option<&CommunityRecord> {
        self.working.communities.iter().find(|c| c.id == id)
    }

    fn community_mut(
        &mut self,
        id: CommunityId,
    ) -> Result<&mut CommunityRecord, CommunityRepositoryError> {
        self.working
            .communities
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CommunityRepositoryError::community_not_found(id.to_string()))
    }

    fn members(&self, id: CommunityId) -> Vec<Member> {
        self.community(id)
            .map(|community| community.members.clone())
            .unwrap_or_default()
    }

    fn newest_first(communities: &mut [CommunityRecord]) {
        communities.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    }
}

fn by_join_date(a: &Member, b: &Member) -> Ordering {
    a.joined_at
        .cmp(&b.joined_at)
        .then_with(|| a.user_id.cmp(&b.user_id))
}

fn matches_filter(community: &CommunityRecord, filter: &CommunityFilter) -> bool {
    if community.archived_at.is_some() {
        return false;
    }
    let name_matches = filter.name.as_deref().is_none_or(|needle| {
        community
            .name
            .as_str()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    });
    if !name_matches || filter.privacy.is_some_and(|privacy| privacy != community.privacy) {
        return false;
    }
    filter.categories.is_empty()
        || community
            .categories
            .iter()
            .any(|link| filter.categories.contains(&link.category.name))
}

#[async_trait]
impl CommunityTransaction for InMemoryTransaction {
    async fn find_by_name(
        &mut self,
        name: &CommunityName,
    ) -> Result<Option<CommunityRecord>, CommunityRepositoryError> {
        Ok(self
            .working
            .communities
            .iter()
            .find(|c| &c.name == name)
            .cloned())
    }

    async fn find_by_id(
        &mut self,
        id: CommunityId,
    ) -> Result<Option<CommunityRecord>, CommunityRepositoryError> {
        Ok(self.community(id).cloned())
    }

    async fn find_all(&mut self) -> Result<Vec<CommunityRecord>, CommunityRepositoryError> {
        let mut communities = self.working.communities.clone();
        Self::newest_first(&mut communities);
        Ok(communities)
    }

    async fn find_page(
        &mut self,
        filter: &CommunityFilter,
        sort: CommunitySortKey,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Page<CommunityRecord>, CommunityRepositoryError> {
        let mut matching: Vec<CommunityRecord> = self
            .working
            .communities
            .iter()
            .filter(|c| matches_filter(c, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let ordering = match sort {
                CommunitySortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                CommunitySortKey::Name => a.name.as_str().cmp(b.name.as_str()),
            };
            let ordering = match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.slice(matching))
    }

    async fn find_by_member(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<CommunityRecord>, CommunityRepositoryError> {
        let mut joined: Vec<CommunityRecord> = self
            .working
            .communities
            .iter()
            .filter(|c| c.members.iter().any(|m| &m.user_id == user_id))
            .cloned()
            .collect();
        Self::newest_first(&mut joined);
        Ok(joined)
    }

    async fn create(
        &mut self,
        community: &NewCommunity,
    ) -> Result<CommunityRecord, CommunityRepositoryError> {
        if self
            .working
            .communities
            .iter()
            .any(|c| c.name == community.name)
        {
            return Err(CommunityRepositoryError::duplicate_name(
                community.name.to_string(),
            ));
        }
        let record = CommunityRecord {
            id: community.id,
            name: community.name.clone(),
            description: community.description.clone(),
            image: community.image.clone(),
            privacy: community.privacy,
            recipe_creation_permission: community.recipe_creation_permission,
            owner_id: community.owner_id.clone(),
            created_at: community.created_at,
            updated_at: community.created_at,
            archived_at: None,
            categories: community
                .categories
                .iter()
                .cloned()
                .map(|category| CommunityCategoryLink { category })
                .collect(),
            members: vec![community.owner_membership.clone().into_member()],
        };
        self.working.communities.push(record.clone());
        debug!(community_id = %record.id, "community inserted");
        Ok(record)
    }

    async fn find_member(
        &mut self,
        community_id: CommunityId,
        user_id: &UserId,
    ) -> Result<Option<Member>, CommunityRepositoryError> {
        Ok(self
            .community(community_id)
            .and_then(|c| c.members.iter().find(|m| &m.user_id == user_id))
            .cloned())
    }

    async fn is_member(
        &mut self,
        community_id: CommunityId,
        user_id: &UserId,
    ) -> Result<bool, CommunityRepositoryError> {
        Ok(self
            .community(community_id)
            .is_some_and(|c| c.members.iter().any(|m| &m.user_id == user_id)))
    }

    async fn add_member(&mut self, member: &NewMember) -> Result<Member, CommunityRepositoryError> {
        let community = self.community_mut(member.community_id)?;
        if community.members.iter().any(|m| m.user_id == member.user_id) {
            return Err(CommunityRepositoryError::duplicate_member(
                member.community_id.to_string(),
                member.user_id.to_string(),
            ));
        }
        let stored = member.clone().into_member();
        community.members.push(stored.clone());
        debug!(
            community_id = %member.community_id,
            user_id = %member.user_id,
            role = %member.role,
            "member inserted"
        );
        Ok(stored)
    }

    async fn get_admins(
        &mut self,
        community_id: CommunityId,
    ) -> Result<Vec<Member>, CommunityRepositoryError> {
        let mut admins = self.members(community_id);
        admins.retain(Member::is_admin);
        Ok(admins)
    }

    async fn remove_member(
        &mut self,
        community_id: CommunityId,
        user_id: &UserId,
    ) -> Result<Member, CommunityRepositoryError> {
        let community = self.community_mut(community_id)?;
        let position = community
            .members
            .iter()
            .position(|m| &m.user_id == user_id)
            .ok_or_else(|| {
                CommunityRepositoryError::member_not_found(
                    community_id.to_string(),
                    user_id.to_string(),
                )
            })?;
        let removed = community.members.remove(position);
        debug!(community_id = %community_id, user_id = %user_id, "member removed");
        Ok(removed)
    }

    async fn get_members_sorted_by_join_date(
        &mut self,
        community_id: CommunityId,
    ) -> Result<Vec<Member>, CommunityRepositoryError> {
        let mut members = self.members(community_id);
        members.sort_by(by_join_date);
        Ok(members)
    }

    async fn get_all_members(
        &mut self,
        community_id: CommunityId,
    ) -> Result<Vec<Member>, CommunityRepositoryError> {
        Ok(self.members(community_id))
    }

    async fn find_members_page(
        &mut self,
        community_id: CommunityId,
        role: Option<MemberRole>,
        page: PageRequest,
    ) -> Result<Page<Member>, CommunityRepositoryError> {
        let mut members = self.members(community_id);
        if let Some(role) = role {
            members.retain(|m| m.role == role);
        }
        members.sort_by(by_join_date);
        Ok(page.slice(members))
    }

    async fn make_admins(
        &mut self,
        community_id: CommunityId,
        user_ids: &[UserId],
    ) -> Result<Vec<Member>, CommunityRepositoryError> {
        let community = self.community_mut(community_id)?;
        let mut promoted = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            let member = community
                .members
                .iter_mut()
                .find(|m| &m.user_id == user_id)
                .ok_or_else(|| {
                    CommunityRepositoryError::member_not_found(
                        community_id.to_string(),
                        user_id.to_string(),
                    )
                })?;
            member.role = MemberRole::Admin;
            promoted.push(member.clone());
        }
        debug!(community_id = %community_id, promoted = promoted.len(), "members promoted");
        Ok(promoted)
    }

    async fn delete_community(
        &mut self,
        community_id: CommunityId,
    ) -> Result<(), CommunityRepositoryError> {
        let before = self.working.communities.len();
        self.working.communities.retain(|c| c.id != community_id);
        if self.working.communities.len() == before {
            return Err(CommunityRepositoryError::community_not_found(
                community_id.to_string(),
            ));
        }
        debug!(community_id = %community_id, "community deleted");
        Ok(())
    }

    async fn archive_community(
        &mut self,
        community_id: CommunityId,
        archived_at: DateTime<Utc>,
    ) -> Result<(), CommunityRepositoryError> {
        let community = self.community_mut(community_id)?;
        community.archived_at = Some(archived_at);
        community.updated_at = archived_at;
        debug!(community_id = %community_id, "community archived");
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), CommunityRepositoryError> {
        let Self {
            mut committed,
            working,
        } = *self;
        *committed = working;
        debug!("community transaction committed");
        Ok(())
    }
}
