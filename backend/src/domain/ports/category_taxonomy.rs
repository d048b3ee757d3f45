//! Read-only port onto the externally managed category taxonomy.
//!
//! Categories are never created by the community core; creation only checks
//! that each requested name already exists.

use async_trait::async_trait;

use crate::domain::{Category, CategoryName};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading the category taxonomy.
    pub enum CategoryTaxonomyError {
        /// Taxonomy store could not be reached.
        Connection { message: String } =>
            "category taxonomy connection failed: {message}",
        /// Lookup failed during execution or row conversion.
        Query { message: String } =>
            "category taxonomy query failed: {message}",
    }
}

/// Port for resolving category names against the taxonomy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryTaxonomy: Send + Sync {
    /// Return the taxonomy entries whose names appear in `names`.
    ///
    /// Names are matched exactly. Unknown names are simply absent from the
    /// result; callers compare the two lists to report them.
    async fn find_categories_by_names(
        &self,
        names: &[CategoryName],
    ) -> Result<Vec<Category>, CategoryTaxonomyError>;
}

/// Fixture taxonomy that knows no categories.
///
/// Suits tests that only create uncategorised communities.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCategoryTaxonomy;

#[async_trait]
impl CategoryTaxonomy for FixtureCategoryTaxonomy {
    async fn find_categories_by_names(
        &self,
        _names: &[CategoryName],
    ) -> Result<Vec<Category>, CategoryTaxonomyError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_taxonomy_resolves_nothing() {
        let names = vec![CategoryName::new("Italian").expect("valid name")];
        let found = FixtureCategoryTaxonomy
            .find_categories_by_names(&names)
            .await
            .expect("fixture lookup succeeds");
        assert!(found.is_empty());
    }

    #[rstest]
    fn connection_errors_name_the_taxonomy() {
        let error = CategoryTaxonomyError::connection("pool exhausted");
        assert_eq!(
            error.to_string(),
            "category taxonomy connection failed: pool exhausted"
        );
    }
}
