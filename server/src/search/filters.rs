use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::utils::error::FieldError;

/// Reserved category value meaning "no category filter".
pub const CATEGORY_ALL: &str = "all";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// A numeric parameter that may arrive as a JSON number (POST body) or as
/// a query-string token (GET variant).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntParam {
    Int(i64),
    Text(String),
}

impl IntParam {
    fn parse(&self) -> Option<i64> {
        match self {
            IntParam::Int(n) => Some(*n),
            IntParam::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Raw search request as received on the wire, before validation. The
/// GET variant carries the same fields in the query string; when both are
/// present, query-string values override the body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub page: Option<IntParam>,
    pub limit: Option<IntParam>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl SearchRequest {
    /// Merge `overrides` on top of `self`, field by field.
    pub fn overlay(self, overrides: SearchRequest) -> SearchRequest {
        SearchRequest {
            query: overrides.query.or(self.query),
            category: overrides.category.or(self.category),
            start_date: overrides.start_date.or(self.start_date),
            end_date: overrides.end_date.or(self.end_date),
            location: overrides.location.or(self.location),
            page: overrides.page.or(self.page),
            limit: overrides.limit.or(self.limit),
            sort: overrides.sort.or(self.sort),
            order: overrides.order.or(self.order),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Title,
    Price,
}

impl SortField {
    pub fn parse(s: &str) -> Option<SortField> {
        match s {
            "date" => Some(SortField::Date),
            "title" => Some(SortField::Title),
            "price" => Some(SortField::Price),
            _ => None,
        }
    }

    /// Column the sort key maps to. Static strings only; sort input never
    /// reaches the SQL text directly.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Date => "e.date",
            SortField::Title => "e.title",
            SortField::Price => "e.price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A validated filter object. Optional constraints are `None` when absent;
/// `category` is `None` both when omitted and for the `"all"` sentinel.
#[derive(Debug, Clone)]
pub struct EventFilters {
    pub query: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: u32,
    pub limit: u32,
    pub sort: SortField,
    pub order: SortOrder,
}

impl Default for EventFilters {
    fn default() -> Self {
        EventFilters {
            query: None,
            category: None,
            location: None,
            start_date: None,
            end_date: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortField::Date,
            order: SortOrder::Asc,
        }
    }
}

impl EventFilters {
    /// Rows to skip for the requested page. Never negative: page is
    /// validated to be >= 1.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

/// Accepts `yyyy-MM-dd` or a full RFC 3339 timestamp, keeping the calendar
/// date either way.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate a raw request against the configured category list, producing
/// either a complete filter object or itemized field errors. Nothing is
/// silently dropped: a bad sort field or out-of-range limit is rejected,
/// not defaulted.
pub fn validate(req: SearchRequest, categories: &[String]) -> Result<EventFilters, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut filters = EventFilters {
        query: non_empty(req.query),
        location: non_empty(req.location),
        ..EventFilters::default()
    };

    match req.category.as_deref().map(str::trim) {
        None | Some("") | Some(CATEGORY_ALL) => {}
        Some(c) if categories.iter().any(|known| known == c) => {
            filters.category = Some(c.to_string());
        }
        Some(_) => errors.push(FieldError::new("category", "Invalid category")),
    }

    if let Some(raw) = req.start_date.as_deref() {
        match parse_iso_date(raw) {
            Some(d) => filters.start_date = Some(d),
            None => errors.push(FieldError::new(
                "startDate",
                "Start date must be a valid ISO date",
            )),
        }
    }
    if let Some(raw) = req.end_date.as_deref() {
        match parse_iso_date(raw) {
            Some(d) => filters.end_date = Some(d),
            None => errors.push(FieldError::new(
                "endDate",
                "End date must be a valid ISO date",
            )),
        }
    }

    if let Some(page) = req.page {
        match page.parse() {
            Some(n) if (1..=i64::from(u32::MAX)).contains(&n) => filters.page = n as u32,
            _ => errors.push(FieldError::new("page", "Page must be a positive integer")),
        }
    }
    if let Some(limit) = req.limit {
        match limit.parse() {
            Some(n) if (1..=i64::from(MAX_LIMIT)).contains(&n) => filters.limit = n as u32,
            _ => errors.push(FieldError::new("limit", "Limit must be between 1 and 100")),
        }
    }

    if let Some(sort) = req.sort.as_deref() {
        match SortField::parse(sort) {
            Some(f) => filters.sort = f,
            None => errors.push(FieldError::new("sort", "Invalid sort field")),
        }
    }
    match req.order.as_deref() {
        None => {}
        Some("asc") => filters.order = SortOrder::Asc,
        Some("desc") => filters.order = SortOrder::Desc,
        Some(_) => errors.push(FieldError::new("order", "Order must be asc or desc")),
    }

    if errors.is_empty() {
        Ok(filters)
    } else {
        Err(errors)
    }
}
