//! Offset pagination from raw `page` / `limit` query values.
//!
//! Query values arrive as untrusted strings. Anything that is not a positive
//! integer is ignored and the default is kept, so `page=0`, `page=-5` and
//! `page=abc` all mean the first page.

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    limit: i64,
}

impl Pagination {
    /// Page used when none (or an invalid one) is supplied.
    pub const DEFAULT_PAGE: i64 = 1;
    /// Page size used when none (or an invalid one) is supplied.
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Build from raw query values, falling back to defaults.
    #[must_use]
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(Self::DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }

    /// The first page holding up to `limit` shops.
    #[must_use]
    pub const fn first_page(limit: i64) -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: if limit > 0 { limit } else { Self::DEFAULT_LIMIT },
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Maximum number of shops per page.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Zero-based row offset, `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let p = Pagination::from_params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p, Pagination::default());
    }

    #[test]
    fn test_non_positive_page_uses_default() {
        assert_eq!(Pagination::from_params(Some("0"), None).page(), 1);
        assert_eq!(Pagination::from_params(Some("-5"), None).page(), 1);
    }

    #[test]
    fn test_non_numeric_values_use_defaults() {
        let p = Pagination::from_params(Some("abc"), Some("ten"));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);

        let p = Pagination::from_params(Some(""), Some("2.5"));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn test_zero_limit_uses_default() {
        assert_eq!(Pagination::from_params(None, Some("0")).limit(), 10);
    }

    #[test]
    fn test_offset() {
        let p = Pagination::from_params(Some("3"), Some("20"));
        assert_eq!(p.offset(), 40);

        let p = Pagination::from_params(Some("2"), None);
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn test_offset_saturates() {
        let p = Pagination::from_params(Some(i64::MAX.to_string().as_str()), Some("1000"));
        assert_eq!(p.offset(), i64::MAX);
    }

    #[test]
    fn test_first_page() {
        let p = Pagination::first_page(6);
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 6, 0));
        assert_eq!(Pagination::first_page(0), Pagination::default());
    }
}
