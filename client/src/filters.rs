use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_LIMIT: u32 = 10;

/// Inclusive calendar-date range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Client-side filter object: one complete value per user interaction,
/// never partially applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub date_range: Option<DateRange>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl EventFilters {
    pub fn limit_or_default(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Translate into the server's request shape: `search` becomes
    /// `query` and the date range decomposes into `startDate`/`endDate`.
    pub fn to_request(&self) -> SearchRequestBody {
        let range = self.date_range.unwrap_or_default();
        SearchRequestBody {
            query: self.search.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
            start_date: range.start,
            end_date: range.end,
            page: self.page,
            limit: self.limit,
            sort: self.sort.clone(),
            order: self.order.clone(),
        }
    }
}

/// Wire shape of `POST /api/events/search`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OrganizerRef {
    pub id: Uuid,
    pub name: String,
}

/// An event as the API returns it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub tickets_available: i64,
    pub price: f64,
    pub status: String,
    pub organizer: OrganizerRef,
    #[serde(default)]
    pub starred: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pagination summary attached to every search response.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchPage {
    pub data: Vec<Event>,
    pub meta: PageMeta,
}

impl SearchPage {
    /// The degraded "no results" page: all-zero totals at the requested
    /// limit. Indistinguishable on the wire from a genuinely empty match
    /// set; the typed error channel exists for callers that care.
    pub fn empty(limit: u32) -> Self {
        SearchPage {
            data: Vec::new(),
            meta: PageMeta {
                total: 0,
                page: 1,
                limit,
                total_pages: 0,
            },
        }
    }
}
