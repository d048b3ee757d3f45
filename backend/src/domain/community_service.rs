//! Community lifecycle service implementing the community driving ports.
//!
//! Each operation opens exactly one repository transaction. Writes commit at
//! the end of a successful operation; any error returned earlier drops the
//! transaction and with it every write made so far.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::community_membership_ops::{join, leave, promote};
use crate::domain::community_service_support::{
    community_not_found, map_repository_error, map_taxonomy_error, parse_community_id,
    parse_user_id,
};
use crate::domain::ports::{
    CategoryTaxonomy, CommunityCommand, CommunityQuery, CommunityRepository, CommunityTransaction,
    CreateCommunityRequest, DeleteCommunityRequest, LeaveCommunityResponse, MembershipRequest,
    SetAdminsRequest,
};
use crate::domain::{
    Category, CategoryName, Community, CommunityDraft, CommunityId, CommunityListQuery,
    CommunityName, CommunityRecord, DEFAULT_PAGE_LIMIT, Error, LastMemberPolicy, Member,
    MemberListQuery, MemberRole, NewCommunity, NewMember, Page, UserId, resolve_categories,
    validate_description, validate_image,
};

/// Flatten a stored community into the shape returned to callers.
///
/// Applied uniformly to single and list fetches.
pub fn format_community_response(record: CommunityRecord) -> Community {
    Community::from(record)
}

/// Tunables resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityServiceOptions {
    /// Applied when a departure leaves a community without members.
    pub last_member_policy: LastMemberPolicy,
    /// Page size used when a listing omits `limit`.
    pub default_page_limit: u32,
}

impl Default for CommunityServiceOptions {
    fn default() -> Self {
        Self {
            last_member_policy: LastMemberPolicy::default(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Community service implementing [`CommunityCommand`] and
/// [`CommunityQuery`].
#[derive(Clone)]
pub struct CommunityService<R, T> {
    community_repo: Arc<R>,
    taxonomy: Arc<T>,
    clock: Arc<dyn Clock>,
    options: CommunityServiceOptions,
}

impl<R, T> CommunityService<R, T> {
    /// Create a service over a community store and a category taxonomy.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// use mealflow_backend::domain::{CommunityService, CommunityServiceOptions};
    /// use mealflow_backend::outbound::memory::InMemoryCommunityStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryCommunityStore::new());
    /// let service = CommunityService::new(
    ///     store.clone(),
    ///     store,
    ///     Arc::new(DefaultClock),
    ///     CommunityServiceOptions::default(),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        community_repo: Arc<R>,
        taxonomy: Arc<T>,
        clock: Arc<dyn Clock>,
        options: CommunityServiceOptions,
    ) -> Self {
        Self {
            community_repo,
            taxonomy,
            clock,
            options,
        }
    }
}

impl<R, T> CommunityService<R, T>
where
    R: CommunityRepository,
    T: CategoryTaxonomy,
{
    async fn begin(&self) -> Result<Box<dyn CommunityTransaction>, Error> {
        self.community_repo
            .begin()
            .await
            .map_err(map_repository_error)
    }

    async fn commit(tx: Box<dyn CommunityTransaction>) -> Result<(), Error> {
        tx.commit().await.map_err(map_repository_error)
    }

    /// Look up every requested name, failing with the full list of names
    /// the taxonomy does not know.
    async fn validate_categories(&self, names: &[CategoryName]) -> Result<Vec<Category>, Error> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let found = self
            .taxonomy
            .find_categories_by_names(names)
            .await
            .map_err(map_taxonomy_error)?;
        let mut by_name: HashMap<&str, &Category> = found
            .iter()
            .map(|category| (category.name.as_str(), category))
            .collect();

        let mut resolved = Vec::with_capacity(names.len());
        let mut invalid = Vec::new();
        for name in names {
            match by_name.remove(name.as_str()) {
                Some(category) => resolved.push(category.clone()),
                None => invalid.push(name.to_string()),
            }
        }
        if !invalid.is_empty() {
            return Err(Error::invalid_request(format!(
                "Invalid categories: {}",
                invalid.join(", ")
            ))
            .with_details(json!({ "invalidCategories": invalid })));
        }
        Ok(resolved)
    }

    async fn build_community(
        &self,
        draft: &CommunityDraft,
        name: CommunityName,
        owner_id: UserId,
    ) -> Result<NewCommunity, Error> {
        let description = validate_description(draft.description.as_deref())?;
        let image = validate_image(draft.image.as_deref())?;
        let category_names = resolve_categories(&draft.categories)?;
        let categories = self.validate_categories(&category_names).await?;

        let id = CommunityId::random();
        let created_at = self.clock.utc();
        Ok(NewCommunity {
            id,
            name,
            description,
            image,
            privacy: draft.privacy.unwrap_or_default(),
            recipe_creation_permission: draft.recipe_creation_permission.unwrap_or_default(),
            owner_membership: NewMember {
                community_id: id,
                user_id: owner_id.clone(),
                role: MemberRole::Admin,
                joined_at: created_at,
            },
            owner_id,
            created_at,
            categories,
        })
    }
}

#[async_trait]
impl<R, T> CommunityCommand for CommunityService<R, T>
where
    R: CommunityRepository,
    T: CategoryTaxonomy,
{
    async fn create_community(&self, request: CreateCommunityRequest) -> Result<Community, Error> {
        let owner_id = parse_user_id(&request.actor_id)?;
        let name = CommunityName::new(&request.draft.name)?;

        let mut tx = self.begin().await?;
        let existing = tx.find_by_name(&name).await.map_err(map_repository_error)?;
        if existing.is_some() {
            return Err(Error::conflict("Community name already exists")
                .with_details(json!({ "name": name.as_str() })));
        }

        let community = self
            .build_community(&request.draft, name, owner_id)
            .await?;
        let record = tx.create(&community).await.map_err(map_repository_error)?;
        Self::commit(tx).await?;

        info!(
            community_id = %record.id,
            owner_id = %record.owner_id,
            categories = record.categories.len(),
            "community created"
        );
        Ok(format_community_response(record))
    }

    async fn join_community(&self, request: MembershipRequest) -> Result<Member, Error> {
        let community_id = parse_community_id(&request.community_id)?;
        let user_id = parse_user_id(&request.user_id)?;

        let mut tx = self.begin().await?;
        let member = join(tx.as_mut(), community_id, &user_id, self.clock.utc()).await?;
        Self::commit(tx).await?;
        Ok(member)
    }

    async fn leave_community(
        &self,
        request: MembershipRequest,
    ) -> Result<LeaveCommunityResponse, Error> {
        let community_id = parse_community_id(&request.community_id)?;
        let user_id = parse_user_id(&request.user_id)?;

        let mut tx = self.begin().await?;
        let response = leave(
            tx.as_mut(),
            community_id,
            &user_id,
            self.clock.utc(),
            self.options.last_member_policy,
        )
        .await?;
        Self::commit(tx).await?;
        Ok(response)
    }

    async fn set_admins(&self, request: SetAdminsRequest) -> Result<Vec<Member>, Error> {
        let community_id = parse_community_id(&request.community_id)?;
        let requested_by = parse_user_id(&request.requested_by)?;
        if request.member_ids.is_empty() {
            return Err(Error::invalid_request("memberIds must not be empty")
                .with_details(json!({ "field": "memberIds" })));
        }
        let mut member_ids = Vec::with_capacity(request.member_ids.len());
        let mut malformed = Vec::new();
        for raw in &request.member_ids {
            match UserId::new(raw) {
                Ok(id) => member_ids.push(id),
                Err(_) => malformed.push(raw.clone()),
            }
        }
        if !malformed.is_empty() {
            return Err(Error::invalid_request("memberIds must be valid user ids")
                .with_details(json!({ "invalidMemberIds": malformed })));
        }

        let mut tx = self.begin().await?;
        tx.find_by_id(community_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| community_not_found(community_id))?;
        let promoted = promote(tx.as_mut(), community_id, &requested_by, &member_ids).await?;
        Self::commit(tx).await?;
        Ok(promoted)
    }

    async fn delete_community(&self, request: DeleteCommunityRequest) -> Result<(), Error> {
        let community_id = parse_community_id(&request.community_id)?;
        let actor_id = parse_user_id(&request.actor_id)?;

        let mut tx = self.begin().await?;
        let community = tx
            .find_by_id(community_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| community_not_found(community_id))?;
        if community.owner_id != actor_id {
            return Err(
                Error::forbidden("Only the community owner can delete it").with_details(json!({
                    "communityId": community_id.to_string(),
                    "userId": actor_id.to_string(),
                })),
            );
        }
        tx.delete_community(community_id)
            .await
            .map_err(map_repository_error)?;
        Self::commit(tx).await?;

        info!(community_id = %community_id, owner_id = %actor_id, "community deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, T> CommunityQuery for CommunityService<R, T>
where
    R: CommunityRepository,
    T: CategoryTaxonomy,
{
    async fn get_community_by_id(&self, community_id: &str) -> Result<Community, Error> {
        let community_id = parse_community_id(community_id)?;
        let mut tx = self.begin().await?;
        let record = tx
            .find_by_id(community_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| community_not_found(community_id))?;
        Ok(format_community_response(record))
    }

    async fn get_all_communities(&self) -> Result<Vec<Community>, Error> {
        let mut tx = self.begin().await?;
        let records = tx.find_all().await.map_err(map_repository_error)?;
        Ok(records.into_iter().map(format_community_response).collect())
    }

    async fn list_communities(&self, query: CommunityListQuery) -> Result<Page<Community>, Error> {
        let page = query.page_request(self.options.default_page_limit)?;
        let mut tx = self.begin().await?;
        let records = tx
            .find_page(&query.filter, query.sort, query.order, page)
            .await
            .map_err(map_repository_error)?;
        Ok(records.map(format_community_response))
    }

    async fn get_all_members(&self, community_id: &str) -> Result<Vec<Member>, Error> {
        let community_id = parse_community_id(community_id)?;
        let mut tx = self.begin().await?;
        tx.get_all_members(community_id)
            .await
            .map_err(map_repository_error)
    }

    async fn list_members(
        &self,
        community_id: &str,
        query: MemberListQuery,
    ) -> Result<Page<Member>, Error> {
        let community_id = parse_community_id(community_id)?;
        let page = query.page_request(self.options.default_page_limit)?;
        let mut tx = self.begin().await?;
        tx.find_by_id(community_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| community_not_found(community_id))?;
        tx.find_members_page(community_id, query.role, page)
            .await
            .map_err(map_repository_error)
    }

    async fn get_joined_communities(&self, user_id: &str) -> Result<Vec<Community>, Error> {
        let user_id = parse_user_id(user_id)?;
        let mut tx = self.begin().await?;
        let records = tx
            .find_by_member(&user_id)
            .await
            .map_err(map_repository_error)?;
        Ok(records.into_iter().map(format_community_response).collect())
    }
}

#[cfg(test)]
#[path = "community_service_tests.rs"]
mod tests;
