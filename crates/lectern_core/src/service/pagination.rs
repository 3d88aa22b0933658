//! Page/limit resolution and the paginated response envelope.
//!
//! # Invariants
//! - `page` and `limit` are both at least 1 once resolved.
//! - `meta.total` counts every record under the same filter, not just the slice.

use crate::service::error::ServiceError;
use serde::{Deserialize, Serialize};

/// Raw paging parameters as received from a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

/// Resolved, validated paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    /// Number of records before this page.
    pub fn skip(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Applies defaults, rejects zero values and clamps to `max_limit`.
pub fn resolve_window(
    request: PageRequest,
    default_limit: u32,
    max_limit: Option<u32>,
) -> Result<PageWindow, ServiceError> {
    let page = request.page.unwrap_or(1);
    if page == 0 {
        return Err(ServiceError::InvalidPage {
            field: "page",
            value: page,
        });
    }
    let mut limit = request.limit.unwrap_or(default_limit);
    if limit == 0 {
        return Err(ServiceError::InvalidPage {
            field: "limit",
            value: limit,
        });
    }
    if let Some(max) = max_limit {
        limit = limit.min(max.max(1));
    }
    Ok(PageWindow { page, limit })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, window: PageWindow) -> Self {
        Self {
            total,
            page: window.page,
            limit: window.limit,
            total_pages: total.div_ceil(u64::from(window.limit)),
        }
    }
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Converts every item, keeping the metadata; stops at the first error.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Page {
            data: self.data.into_iter().map(f).collect::<Result<_, _>>()?,
            meta: self.meta,
        })
    }
}

/// Resolves the window, then runs `count` and `fetch(skip, take)`.
pub fn paginate<T, C, F>(
    request: PageRequest,
    default_limit: u32,
    max_limit: Option<u32>,
    count: C,
    fetch: F,
) -> Result<Page<T>, ServiceError>
where
    C: FnOnce() -> Result<u64, ServiceError>,
    F: FnOnce(u64, u64) -> Result<Vec<T>, ServiceError>,
{
    let window = resolve_window(request, default_limit, max_limit)?;
    let total = count()?;
    let data = if window.skip() >= total {
        Vec::new()
    } else {
        fetch(window.skip(), u64::from(window.limit))?
    };
    Ok(Page {
        data,
        meta: PageMeta::new(total, window),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(total: u32, request: PageRequest) -> Page<u32> {
        paginate(
            request,
            20,
            Some(100),
            || Ok(u64::from(total)),
            |skip, take| {
                Ok((1..=total)
                    .skip(skip as usize)
                    .take(take as usize)
                    .collect())
            },
        )
        .expect("valid request")
    }

    #[test]
    fn second_page_of_twenty_five() {
        let page = numbers(25, PageRequest::new(2, 10));
        assert_eq!(page.data, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.meta.total, 25);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[test]
    fn defaults_apply_when_unset() {
        let page = numbers(5, PageRequest::default());
        assert_eq!(page.meta.page, 1);
        assert_eq!(page.meta.limit, 20);
        assert_eq!(page.data.len(), 5);
    }

    #[test]
    fn page_past_the_end_is_empty_but_counts() {
        let page = numbers(25, PageRequest::new(9, 10));
        assert!(page.data.is_empty());
        assert_eq!(page.meta.total, 25);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page = numbers(0, PageRequest::default());
        assert_eq!(page.meta.total_pages, 0);
    }

    #[test]
    fn zero_page_or_limit_is_rejected() {
        for (request, field) in [
            (PageRequest::new(0, 10), "page"),
            (PageRequest::new(1, 0), "limit"),
        ] {
            let error = resolve_window(request, 20, None).expect_err("zero rejected");
            assert!(matches!(error, ServiceError::InvalidPage { field: f, .. } if f == field));
        }
    }

    #[test]
    fn oversized_limit_is_clamped() {
        let window = resolve_window(PageRequest::new(1, 5000), 20, Some(100)).expect("valid");
        assert_eq!(window.limit, 100);
        let window = resolve_window(PageRequest::new(1, 5000), 20, None).expect("valid");
        assert_eq!(window.limit, 5000);
    }

    #[test]
    fn meta_serializes_total_pages_in_camel_case() {
        let meta = PageMeta::new(3, PageWindow { page: 1, limit: 2 });
        let json = serde_json::to_value(meta).expect("serialize");
        assert_eq!(json["totalPages"], 2);
    }
}
