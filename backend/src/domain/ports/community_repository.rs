//! Transactional persistence port for communities and their members.
//!
//! Every service operation opens one [`CommunityTransaction`], performs its
//! reads and writes through it and commits once. Dropping a transaction
//! without committing discards all of its writes, so a failed validation
//! halfway through an operation never leaves partial rows behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CommunityFilter, CommunityId, CommunityName, CommunityRecord, CommunitySortKey, Member,
    MemberRole, NewCommunity, NewMember, Page, PageRequest, SortOrder, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by community persistence adapters.
    pub enum CommunityRepositoryError {
        /// Store could not be reached or a transaction could not be opened.
        Connection { message: String } =>
            "community repository connection failed: {message}",
        /// Statement failed during execution or row conversion.
        Query { message: String } =>
            "community repository query failed: {message}",
        /// Unique constraint on the community name was violated.
        DuplicateName { name: String } =>
            "community name {name} is already taken",
        /// A membership row for the pair already exists.
        DuplicateMember { community_id: String, user_id: String } =>
            "user {user_id} is already a member of community {community_id}",
        /// The referenced community row does not exist.
        CommunityNotFound { community_id: String } =>
            "community {community_id} does not exist",
        /// The referenced membership row does not exist.
        MemberNotFound { community_id: String, user_id: String } =>
            "user {user_id} is not a member of community {community_id}",
    }
}

/// Port for opening units of work against the community store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// Open a transaction.
    ///
    /// Adapters serialise conflicting transactions so that, for example, two
    /// concurrent departures cannot both observe a second admin.
    async fn begin(&self) -> Result<Box<dyn CommunityTransaction>, CommunityRepositoryError>;
}

/// A single unit of work against the community store.
///
/// Reads observe the transaction's own earlier writes. Member lists only
/// ever contain active memberships.
#[async_trait]
pub trait CommunityTransaction: Send {
    /// Look up a community by its exact, case-sensitive name.
    async fn find_by_name(
        &mut self,
        name: &CommunityName,
    ) -> Result<Option<CommunityRecord>, CommunityRepositoryError>;

    async fn find_by_id(
        &mut self,
        id: CommunityId,
    ) -> Result<Option<CommunityRecord>, CommunityRepositoryError>;

    /// Every community, newest first.
    async fn find_all(&mut self) -> Result<Vec<CommunityRecord>, CommunityRepositoryError>;

    /// One page of non-archived communities matching `filter`.
    async fn find_page(
        &mut self,
        filter: &CommunityFilter,
        sort: CommunitySortKey,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Page<CommunityRecord>, CommunityRepositoryError>;

    /// Communities in which `user_id` holds a membership, newest first.
    async fn find_by_member(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<CommunityRecord>, CommunityRepositoryError>;

    /// Insert the community together with its owner membership and
    /// category links.
    async fn create(
        &mut self,
        community: &NewCommunity,
    ) -> Result<CommunityRecord, CommunityRepositoryError>;

    async fn find_member(
        &mut self,
        community_id: CommunityId,
        user_id: &UserId,
    ) -> Result<Option<Member>, CommunityRepositoryError>;

    async fn is_member(
        &mut self,
        community_id: CommunityId,
        user_id: &UserId,
    ) -> Result<bool, CommunityRepositoryError>;

    async fn add_member(&mut self, member: &NewMember) -> Result<Member, CommunityRepositoryError>;

    async fn get_admins(
        &mut self,
        community_id: CommunityId,
    ) -> Result<Vec<Member>, CommunityRepositoryError>;

    /// Delete a membership row of either role and return it.
    async fn remove_member(
        &mut self,
        community_id: CommunityId,
        user_id: &UserId,
    ) -> Result<Member, CommunityRepositoryError>;

    /// Members ordered by ascending `joined_at`.
    async fn get_members_sorted_by_join_date(
        &mut self,
        community_id: CommunityId,
    ) -> Result<Vec<Member>, CommunityRepositoryError>;

    async fn get_all_members(
        &mut self,
        community_id: CommunityId,
    ) -> Result<Vec<Member>, CommunityRepositoryError>;

    /// One page of members ordered by ascending `joined_at`, restricted to
    /// `role` when given.
    async fn find_members_page(
        &mut self,
        community_id: CommunityId,
        role: Option<MemberRole>,
        page: PageRequest,
    ) -> Result<Page<Member>, CommunityRepositoryError>;

    /// Set the `ADMIN` role on every listed member and return the updated
    /// rows in the order given.
    async fn make_admins(
        &mut self,
        community_id: CommunityId,
        user_ids: &[UserId],
    ) -> Result<Vec<Member>, CommunityRepositoryError>;

    /// Remove the community along with its members and category links.
    async fn delete_community(
        &mut self,
        community_id: CommunityId,
    ) -> Result<(), CommunityRepositoryError>;

    async fn archive_community(
        &mut self,
        community_id: CommunityId,
        archived_at: DateTime<Utc>,
    ) -> Result<(), CommunityRepositoryError>;

    /// Make every write performed through this transaction durable.
    async fn commit(self: Box<Self>) -> Result<(), CommunityRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::duplicate_name(
        CommunityRepositoryError::duplicate_name("Soup Club"),
        "community name Soup Club is already taken"
    )]
    #[case::missing_member(
        CommunityRepositoryError::member_not_found("c-1", "u-1"),
        "user u-1 is not a member of community c-1"
    )]
    fn constraint_errors_describe_the_rows(
        #[case] error: CommunityRepositoryError,
        #[case] expected: &str,
    ) {
        assert_eq!(error.to_string(), expected);
    }
}
