//! Page-number pagination primitives shared by Bistro backend endpoints.
//!
//! Endpoints accept a [`PageParams`] query, normalise it into a
//! [`PageRequest`] using per-endpoint [`PageLimits`], and answer with a
//! [`Page`] envelope:
//!
//! ```
//! use pagination::{Page, PageLimits, PageParams};
//!
//! let limits = PageLimits::new(12, 100);
//! let request = limits
//!     .resolve(PageParams { page: Some(2), limit: Some(5) })
//!     .expect("valid page request");
//! assert_eq!(request.offset(), 5);
//!
//! let page = Page::new(vec!["f", "g"], 7, request);
//! assert_eq!(page.total_pages, 2);
//! assert!(!page.has_next());
//! ```

use serde::{Deserialize, Serialize};

/// Raw pagination query parameters as supplied by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageParams {
    /// One-based page number.
    pub page: Option<u32>,
    /// Maximum number of items on a page.
    pub limit: Option<u32>,
}

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// Page numbers start at one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A zero-sized page cannot make progress.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Default and maximum page sizes for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    default_limit: u32,
    max_limit: u32,
}

impl PageLimits {
    /// Build limits; `default_limit` is clamped into `1..=max_limit`.
    #[must_use]
    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    /// Page size used when the client omits `limit`.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Largest page size a client may request.
    #[must_use]
    pub const fn max_limit(&self) -> u32 {
        self.max_limit
    }

    /// Resolve client parameters into a validated request.
    ///
    /// Missing values take defaults and oversized limits are capped at
    /// [`PageLimits::max_limit`].
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` or `limit` is zero.
    pub fn resolve(&self, params: PageParams) -> Result<PageRequest, PageRequestError> {
        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        PageRequest::new(page, limit.min(self.max_limit))
    }
}

/// A validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Construct a request for `page` (one-based) holding `limit` items.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is zero.
    pub fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip, suitable for SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// Page size as a signed integer, suitable for SQL `LIMIT`.
    #[must_use]
    pub fn limit_i64(&self) -> i64 {
        i64::from(self.limit)
    }
}

/// Response envelope for one page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Number of pages needed to hold `total` items.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap `items` for the given request and total count.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(u64::from(request.limit)),
        }
    }

    /// Transform every item while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }
}
