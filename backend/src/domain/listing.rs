//! Paging, sorting and filtering for community and member listings.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{CategoryName, Error, MemberRole, Privacy};

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate a page selection.
    ///
    /// # Examples
    /// ```
    /// use mealflow_backend::domain::PageRequest;
    ///
    /// let request = PageRequest::new(2, 25)?;
    /// assert_eq!(request.offset(), 25);
    /// assert!(PageRequest::new(0, 10).is_err());
    /// # Ok::<(), mealflow_backend::domain::Error>(())
    /// ```
    pub fn new(page: u32, limit: u32) -> Result<Self, Error> {
        if page == 0 {
            return Err(Error::invalid_request("page must be at least 1")
                .with_details(json!({ "field": "page", "value": page })));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(Error::invalid_request(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            ))
            .with_details(json!({ "field": "limit", "value": limit })));
        }
        Ok(Self { page, limit })
    }

    /// First page with the given limit, clamped into the accepted range.
    pub fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> usize {
        let skipped = u64::from(self.page - 1) * u64::from(self.limit);
        usize::try_from(skipped).unwrap_or(usize::MAX)
    }

    /// Apply this page to an already filtered and sorted sequence.
    pub fn slice<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let window = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();
        Page::new(window, total, *self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_LIMIT)
    }
}

#[derive(Deserialize)]
struct RawPageRequest {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

const fn first_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = Error;

    fn try_from(value: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(value.page, value.limit)
    }
}

/// A page of results with the totals needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Build a page, deriving the page count from `total`.
    pub fn new(items: Vec<T>, total: usize, request: PageRequest) -> Self {
        let total_pages = u32::try_from(total.div_ceil(request.limit as usize)).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            current_page: request.page,
            total_pages,
        }
    }

    /// Transform every item while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommunitySortKey {
    #[default]
    CreatedAt,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Optional predicates narrowing a community listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityFilter {
    /// Case-insensitive substring of the community name.
    pub name: Option<String>,
    pub privacy: Option<Privacy>,
    /// Matches communities linked to any of these categories.
    #[serde(default)]
    pub categories: Vec<CategoryName>,
}

/// Query for a page of communities.
///
/// `page` and `limit` stay optional here; the service fills gaps from its
/// configured defaults before validating them into a [`PageRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort: CommunitySortKey,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub filter: CommunityFilter,
}

impl CommunityListQuery {
    /// Validated page selection, using `default_limit` when none was given.
    pub fn page_request(&self, default_limit: u32) -> Result<PageRequest, Error> {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(default_limit))
    }
}

/// Query for a page of members, optionally restricted to one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub role: Option<MemberRole>,
}

impl MemberListQuery {
    /// Validated page selection, using `default_limit` when none was given.
    pub fn page_request(&self, default_limit: u32) -> Result<PageRequest, Error> {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(default_limit))
    }
}
