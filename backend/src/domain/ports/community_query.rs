//! Driving port for community and member reads.

use async_trait::async_trait;

use crate::domain::{Community, CommunityListQuery, Error, Member, MemberListQuery, Page};

/// Driving port for community read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityQuery: Send + Sync {
    /// Fetch one community, failing with `not_found` when absent.
    async fn get_community_by_id(&self, community_id: &str) -> Result<Community, Error>;

    /// Every community, newest first.
    async fn get_all_communities(&self) -> Result<Vec<Community>, Error>;

    /// A filtered, sorted page of active communities.
    async fn list_communities(&self, query: CommunityListQuery) -> Result<Page<Community>, Error>;

    /// Every member of a community.
    async fn get_all_members(&self, community_id: &str) -> Result<Vec<Member>, Error>;

    /// A page of members, oldest first, optionally restricted to one role.
    async fn list_members(
        &self,
        community_id: &str,
        query: MemberListQuery,
    ) -> Result<Page<Member>, Error>;

    /// Communities the user belongs to.
    async fn get_joined_communities(&self, user_id: &str) -> Result<Vec<Community>, Error>;
}
