//! Pagination utilities for list endpoints.
//!
//! Lists are page based: `page` (1-indexed) and `per_page`. Out-of-range
//! values are clamped rather than rejected:
//!
//! - `per_page` defaults to 10 and is clamped to [1, 100]
//! - `page` defaults to 1 and is clamped to a minimum of 1
//!
//! # Example
//!
//! ```ignore
//! use quillboard_core::pagination::{Page, PageMeta, PageParams};
//!
//! async fn list_blogs(Query(params): Query<PageParams>) -> Json<Page<Blog>> {
//!     let blogs = fetch(params.per_page(), params.offset()).await;
//!     let total = count().await;
//!     Json(Page::new(blogs, PageMeta::new(&params, total)))
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::serde::deserialize_optional_i64;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Metadata about a paginated response.
///
/// ```json
/// { "current_page": 2, "last_page": 5, "per_page": 10, "total": 42 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    /// Page that was returned (1-indexed)
    pub current_page: i64,
    /// Last page that holds data; 1 when the collection is empty
    pub last_page: i64,
    /// Page size that was applied
    pub per_page: i64,
    /// Number of records matching the filters across all pages
    pub total: i64,
}

impl PageMeta {
    pub fn new(params: &PageParams, total: i64) -> Self {
        let per_page = params.per_page();
        let total = total.max(0);
        let last_page = ((total + per_page - 1) / per_page).max(1);

        Self {
            current_page: params.page(),
            last_page,
            per_page,
            total,
        }
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// A page of records plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, meta: PageMeta) -> Self {
        Self { data, meta }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
}

impl PageParams {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Returns the effective page size, clamped to [1, 100].
    #[must_use]
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Returns the effective page number, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Number of rows to skip for the current page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.per_page())
    }
}
