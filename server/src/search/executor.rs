use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, EventRow};
use crate::utils::error::AppError;

use super::filters::EventFilters;
use super::query;

/// Pagination summary returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub data: Vec<Event>,
    pub meta: PageMeta,
}

/// `ceil(total / limit)`, with zero pages for an empty result set.
pub fn total_pages(total: i64, limit: u32) -> u32 {
    if total <= 0 {
        return 0;
    }
    let total = total as u64;
    let limit = u64::from(limit.max(1));
    ((total + limit - 1) / limit) as u32
}

/// Run the page query and the count query over one predicate and combine
/// them into a result page. A page past the end is not an error: it
/// returns empty `data` with truthful totals.
pub async fn execute(
    pool: &PgPool,
    filters: &EventFilters,
    viewer: Option<Uuid>,
) -> Result<SearchResults, AppError> {
    let mut page = query::page_query(filters, viewer);
    let rows: Vec<EventRow> = page.build_query_as().fetch_all(pool).await?;

    let mut count = query::count_query(filters);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok(SearchResults {
        data: rows.into_iter().map(Event::from).collect(),
        meta: PageMeta {
            total,
            page: filters.page,
            limit: filters.limit,
            total_pages: total_pages(total, filters.limit),
        },
    })
}
