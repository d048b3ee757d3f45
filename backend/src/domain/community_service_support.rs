//! Internal helpers for community services.

use serde_json::json;
use tracing::warn;

use crate::domain::ports::{CategoryTaxonomyError, CommunityRepositoryError};
use crate::domain::{CommunityId, Error, UserId};

pub(crate) fn map_repository_error(error: CommunityRepositoryError) -> Error {
    match error {
        CommunityRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("community repository unavailable: {message}"))
        }
        CommunityRepositoryError::Query { message } => {
            warn!(%message, "community repository query failed");
            Error::internal(format!("community repository error: {message}"))
        }
        CommunityRepositoryError::DuplicateName { name } => {
            Error::conflict("Community name already exists").with_details(json!({ "name": name }))
        }
        CommunityRepositoryError::DuplicateMember {
            community_id,
            user_id,
        } => Error::conflict("User is already a member of this community").with_details(json!({
            "communityId": community_id,
            "userId": user_id,
        })),
        CommunityRepositoryError::CommunityNotFound { community_id } => {
            Error::not_found("Community not found")
                .with_details(json!({ "communityId": community_id }))
        }
        CommunityRepositoryError::MemberNotFound {
            community_id,
            user_id,
        } => Error::not_found("User is not a member of this community").with_details(json!({
            "communityId": community_id,
            "userId": user_id,
        })),
    }
}

pub(crate) fn map_taxonomy_error(error: CategoryTaxonomyError) -> Error {
    match error {
        CategoryTaxonomyError::Connection { message } => {
            Error::service_unavailable(format!("category taxonomy unavailable: {message}"))
        }
        CategoryTaxonomyError::Query { message } => {
            warn!(%message, "category taxonomy query failed");
            Error::internal(format!("category taxonomy error: {message}"))
        }
    }
}

pub(crate) fn parse_community_id(raw: &str) -> Result<CommunityId, Error> {
    Ok(CommunityId::new(raw)?)
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    Ok(UserId::new(raw)?)
}

pub(crate) fn community_not_found(community_id: CommunityId) -> Error {
    Error::not_found("Community not found")
        .with_details(json!({ "communityId": community_id.to_string() }))
}
