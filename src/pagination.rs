//! Offset pagination shared by every listing.

/// A requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u32,
    /// Page size, at least 1.
    pub limit: u32,
}

impl PageRequest {
    /// Create a page request, clamping both values to at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Build a page request from raw query-string values.
    ///
    /// Missing, non-numeric or non-positive values fall back to page 1 and
    /// `default_limit`; the limit is capped at `max_limit`.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        let page = parse_positive(page).unwrap_or(1);
        let limit = parse_positive(limit)
            .unwrap_or(default_limit)
            .min(max_limit.max(1));
        Self::new(page, limit)
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// One page of results plus the totals needed to render pagination.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Page number that was requested.
    pub page: u32,
    /// Page size that was requested.
    pub limit: u32,
    /// Total matching items across all pages.
    pub total: i64,
}

impl<T> Page<T> {
    /// Assemble a page.
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
        }
    }

    /// `ceil(total / limit)`, zero when there are no items.
    pub fn total_pages(&self) -> i64 {
        let limit = i64::from(self.limit.max(1));
        (self.total.max(0) + limit - 1) / limit
    }

    /// Whether pages exist after this one.
    pub fn has_more(&self) -> bool {
        i64::from(self.page) < self.total_pages()
    }

    /// Transform the items, keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }
}
