//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod category_taxonomy;
mod community_command;
mod community_query;
mod community_repository;

#[cfg(test)]
pub use category_taxonomy::MockCategoryTaxonomy;
pub use category_taxonomy::{CategoryTaxonomy, CategoryTaxonomyError, FixtureCategoryTaxonomy};
#[cfg(test)]
pub use community_command::MockCommunityCommand;
pub use community_command::{
    CommunityCommand, CreateCommunityRequest, DeleteCommunityRequest, LeaveCommunityResponse,
    MembershipRequest, SetAdminsRequest,
};
#[cfg(test)]
pub use community_query::MockCommunityQuery;
pub use community_query::CommunityQuery;
#[cfg(test)]
pub use community_repository::MockCommunityRepository;
pub use community_repository::{
    CommunityRepository, CommunityRepositoryError, CommunityTransaction,
};
