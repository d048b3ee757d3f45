//! Domain primitives, aggregates and services for communities.
//!
//! Purpose: model communities, their members and the admin-succession rules
//! independently of any transport or store. Services depend only on the
//! traits in [`ports`]; adapters live under `crate::outbound`.
//!
//! Public surface:
//! - Error / ErrorCode: the error payload every operation returns.
//! - Community, Member and their value objects.
//! - CategoryInput and `resolve_categories`: the category field resolver.
//! - CommunityService: implements the driving ports.

pub mod category;
pub mod community;
mod community_membership_ops;
pub mod community_service;
mod community_service_support;
pub mod error;
pub mod listing;
pub mod membership;
pub mod ports;
pub mod user;

pub use self::category::{
    Category, CategoryInput, CategoryName, CategoryParseError, resolve_categories,
};
pub use self::community::{
    COMMUNITY_DESCRIPTION_MAX, COMMUNITY_NAME_MAX, COMMUNITY_NAME_MIN, Community,
    CommunityCategoryLink, CommunityDraft, CommunityId, CommunityName, CommunityRecord,
    CommunityValidationError, NewCommunity, Privacy, RecipeCreationPermission,
    validate_description, validate_image,
};
pub use self::community_service::{
    CommunityService, CommunityServiceOptions, format_community_response,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::listing::{
    CommunityFilter, CommunityListQuery, CommunitySortKey, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
    MemberListQuery, Page, PageRequest, SortOrder,
};
pub use self::membership::{
    LastMemberPolicy, Member, MemberRole, MembershipState, NewMember, UnknownLastMemberPolicy,
    select_successor,
};
pub use self::user::{UserId, UserValidationError};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use mealflow_backend::domain::{DomainResult, Error};
///
/// fn guard() -> DomainResult<()> {
///     Err(Error::forbidden("only admins may promote members"))
/// }
/// assert!(guard().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
