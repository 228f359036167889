/// Pagination - pure slicing and arithmetic over an ordered result set
///
/// Performs no filtering or scoring; callers hand in an already-ordered
/// sequence and get back the requested window plus metadata.
use crate::error::{AppError, Result};
use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Pagination metadata carried alongside every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Pagination metadata for a result set of `total` items. `page` below 1 is
/// a validation failure; `limit` is clamped to [1, 50] — an intentional
/// design choice, not an error.
pub fn meta(total: i64, page: i64, limit: i64) -> Result<PageMeta> {
    if page < 1 {
        return Err(AppError::validation("page", "Page must be a positive integer"));
    }
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let total_pages = if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    };

    Ok(PageMeta {
        current_page: page,
        total_pages,
        total_items: total,
        has_next: page < total_pages,
        has_prev: page > 1,
    })
}

/// Slice `items` down to the requested page. The window is empty once the
/// offset runs past the end.
pub fn paginate<T: Clone>(items: &[T], page: i64, limit: i64) -> Result<(Vec<T>, PageMeta)> {
    let meta = meta(items.len() as i64, page, limit)?;
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let total = items.len() as i64;
    let offset = (page - 1) * limit;
    let window = if offset >= total {
        Vec::new()
    } else {
        let end = (offset + limit).min(total);
        items[offset as usize..end as usize].to_vec()
    };

    Ok((window, meta))
}
