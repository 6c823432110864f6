use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Organizer reference denormalized onto event read paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerRef {
    pub id: Uuid,
    pub name: String,
}

/// An event as returned by the API, organizer populated.
///
/// `date` is a plain calendar date; `start_time`/`end_time` are venue-local
/// wall-clock times in `HH:mm`. Date-range filtering compares calendar
/// dates only and ignores the time fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
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
    pub image_url: Option<String>,
    pub tickets_available: i32,
    pub price: Decimal,
    pub status: String,
    pub organizer: OrganizerRef,
    /// Whether the current viewer has starred this event. `None` when the
    /// request carried no identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape produced by event queries (events joined with users,
/// plus the per-viewer star flag).
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub category: String,
    pub image_url: Option<String>,
    pub tickets_available: i32,
    pub price: Decimal,
    pub status: String,
    pub organizer_id: Uuid,
    pub organizer_name: String,
    pub starred: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            date: row.date,
            start_time: row.start_time,
            end_time: row.end_time,
            category: row.category,
            image_url: row.image_url,
            tickets_available: row.tickets_available,
            price: row.price,
            status: row.status,
            organizer: OrganizerRef {
                id: row.organizer_id,
                name: row.organizer_name,
            },
            starred: row.starred,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Status assigned to new events when the payload omits one.
pub const DEFAULT_STATUS: &str = "upcoming";

/// Payload accepted by create/update. Fields are optional at the serde
/// level so validation can report itemized per-field errors instead of a
/// single opaque deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub tickets_available: Option<i64>,
    pub price: Option<f64>,
    pub status: Option<String>,
}
