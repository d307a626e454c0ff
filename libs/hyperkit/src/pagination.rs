use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::request::RequestContext;

pub const PAGE_PARAM: &str = "page";
pub const PER_PAGE_PARAM: &str = "per_page";

/// Requested page window. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    page: u64,
    per_page: u64,
}

impl Pagination {
    /// Zero values are raised to 1.
    #[must_use]
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Read `page` and `per_page`, clamping `per_page` into
    /// `1..=max_items_per_page`. Unparsable values fall back to defaults.
    #[must_use]
    pub fn from_request(request: &RequestContext, config: &PaginationConfig) -> Self {
        let page = request
            .query_param(PAGE_PARAM)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1);
        let per_page = request
            .query_param(PER_PAGE_PARAM)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(config.default_items_per_page)
            .clamp(1, config.max_items_per_page.max(1));
        Self::new(page, per_page)
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Last page number for `total` items; an empty collection still has page 1.
    #[must_use]
    pub fn last_page(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    #[must_use]
    pub fn has_next(&self, total: u64) -> bool {
        self.page < self.last_page(total)
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn with_page(&self, page: u64) -> Self {
        Self::new(page, self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, PaginationConfig::default().default_items_per_page)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use url::Url;

    use super::*;

    fn request(query: &str) -> RequestContext {
        RequestContext::new(Url::parse("http://localhost/").unwrap()).with_query(query)
    }

    #[test]
    fn defaults_when_absent_or_invalid() {
        let config = PaginationConfig::default();

        let p = Pagination::from_request(&request(""), &config);
        assert_eq!((p.page(), p.per_page()), (1, 30));

        let p = Pagination::from_request(&request("page=abc&per_page=-3"), &config);
        assert_eq!((p.page(), p.per_page()), (1, 30));
    }

    #[test]
    fn per_page_is_clamped() {
        let config = PaginationConfig {
            default_items_per_page: 10,
            max_items_per_page: 50,
        };

        assert_eq!(
            Pagination::from_request(&request("per_page=500"), &config).per_page(),
            50
        );
        assert_eq!(
            Pagination::from_request(&request("per_page=0"), &config).per_page(),
            1
        );
        assert_eq!(
            Pagination::from_request(&request("page=0"), &config).page(),
            1
        );
    }

    #[test]
    fn window_arithmetic() {
        let p = Pagination::new(2, 10);

        assert_eq!(p.offset(), 10);
        assert_eq!(p.last_page(25), 3);
        assert_eq!(p.last_page(0), 1);
        assert!(p.has_next(25));
        assert!(!p.has_next(20));
        assert!(p.has_previous());
        assert!(!p.with_page(1).has_previous());
    }
}
