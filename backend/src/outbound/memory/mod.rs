//! In-process adapter for the community store and the category taxonomy.
//!
//! The store keeps committed state behind a single async mutex. A
//! transaction holds that lock for its whole lifetime and works on a private
//! copy of the state; `commit` writes the copy back while dropping the
//! transaction simply discards it. Transactions are therefore fully
//! serialised, which is what keeps concurrent departures from both seeing a
//! second admin.

mod transaction;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    CategoryTaxonomy, CategoryTaxonomyError, CommunityRepository, CommunityRepositoryError,
    CommunityTransaction,
};
use crate::domain::{Category, CategoryName, CommunityRecord};

use self::transaction::InMemoryTransaction;

/// Committed rows, ordered by insertion.
#[derive(Debug, Clone, Default)]
struct StoreState {
    communities: Vec<CommunityRecord>,
}

/// Community store and taxonomy held in memory.
///
/// # Examples
/// ```
/// use mealflow_backend::outbound::memory::InMemoryCommunityStore;
///
/// let store = InMemoryCommunityStore::with_category_names(["Italian", "Soup"]);
/// assert_eq!(store.categories().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommunityStore {
    state: Arc<Mutex<StoreState>>,
    taxonomy: Arc<Vec<Category>>,
}

impl InMemoryCommunityStore {
    /// Empty store with an empty taxonomy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store whose taxonomy holds `categories`.
    pub fn with_taxonomy(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            state: Arc::default(),
            taxonomy: Arc::new(categories.into_iter().collect()),
        }
    }

    /// Empty store with a flat taxonomy built from `names`.
    ///
    /// Blank names are skipped.
    pub fn with_category_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_taxonomy(names.into_iter().filter_map(|name| {
            CategoryName::new(name).map(|name| Category {
                id: Uuid::new_v4(),
                name,
                parent_id: None,
            })
        }))
    }

    /// Taxonomy served by [`CategoryTaxonomy`] lookups, including the ids
    /// that community category links carry.
    pub fn categories(&self) -> &[Category] {
        self.taxonomy.as_slice()
    }

    /// Committed communities, in insertion order.
    pub async fn snapshot(&self) -> Vec<CommunityRecord> {
        self.state.lock().await.communities.clone()
    }
}

#[async_trait]
impl CommunityRepository for InMemoryCommunityStore {
    async fn begin(&self) -> Result<Box<dyn CommunityTransaction>, CommunityRepositoryError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        debug!("community transaction opened");
        Ok(Box::new(InMemoryTransaction::new(guard)))
    }
}

#[async_trait]
impl CategoryTaxonomy for InMemoryCommunityStore {
    async fn find_categories_by_names(
        &self,
        names: &[CategoryName],
    ) -> Result<Vec<Category>, CategoryTaxonomyError> {
        Ok(self
            .taxonomy
            .iter()
            .filter(|category| names.contains(&category.name))
            .cloned()
            .collect())
    }
}
