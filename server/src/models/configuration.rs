use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Search-related configuration advertised to clients: which event fields
/// free-text search covers and which sort keys are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilterConfig {
    pub fields: Vec<String>,
    pub sort_options: Vec<String>,
}

/// The runtime configuration document. Exactly one row exists per
/// deployment; [`Configuration::ensure_single`] creates it with defaults
/// on first access.
///
/// The category list here is the single source of truth for category
/// validation; search and event create/update both check against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub event_categories: Vec<String>,
    pub event_statuses: Vec<String>,
    pub time_format: String,
    pub date_format: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub currency_symbol: String,
    pub max_tickets: i32,
    pub min_tickets: i32,
    pub default_location: String,
    pub image_upload_size_limit: i64,
    pub allowed_image_types: Vec<String>,
    pub min_title_length: i32,
    pub max_title_length: i32,
    pub min_description_length: i32,
    pub max_description_length: i32,
    pub api_base_url: String,
    pub default_page_size: i32,
    pub search_filters: SearchFilterConfig,
    pub version: String,
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape of the `configuration` table.
#[derive(Debug, Clone, FromRow)]
pub struct ConfigurationRow {
    pub event_categories: Vec<String>,
    pub event_statuses: Vec<String>,
    pub time_format: String,
    pub date_format: String,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub currency_symbol: String,
    pub max_tickets: i32,
    pub min_tickets: i32,
    pub default_location: String,
    pub image_upload_size_limit: i64,
    pub allowed_image_types: Vec<String>,
    pub min_title_length: i32,
    pub max_title_length: i32,
    pub min_description_length: i32,
    pub max_description_length: i32,
    pub api_base_url: String,
    pub default_page_size: i32,
    pub search_fields: Vec<String>,
    pub sort_options: Vec<String>,
    pub version: String,
    pub updated_at: DateTime<Utc>,
}

impl From<ConfigurationRow> for Configuration {
    fn from(row: ConfigurationRow) -> Self {
        Configuration {
            event_categories: row.event_categories,
            event_statuses: row.event_statuses,
            time_format: row.time_format,
            date_format: row.date_format,
            min_price: row.min_price,
            max_price: row.max_price,
            currency_symbol: row.currency_symbol,
            max_tickets: row.max_tickets,
            min_tickets: row.min_tickets,
            default_location: row.default_location,
            image_upload_size_limit: row.image_upload_size_limit,
            allowed_image_types: row.allowed_image_types,
            min_title_length: row.min_title_length,
            max_title_length: row.max_title_length,
            min_description_length: row.min_description_length,
            max_description_length: row.max_description_length,
            api_base_url: row.api_base_url,
            default_page_size: row.default_page_size,
            search_filters: SearchFilterConfig {
                fields: row.search_fields,
                sort_options: row.sort_options,
            },
            version: row.version,
            updated_at: row.updated_at,
        }
    }
}

/// Whitelisted subset of fields accepted by `PUT /api/config`. Anything
/// not named here is ignored on update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationUpdate {
    pub event_categories: Option<Vec<String>>,
    pub event_statuses: Option<Vec<String>>,
    pub time_format: Option<String>,
    pub date_format: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub currency_symbol: Option<String>,
    pub max_tickets: Option<i32>,
    pub min_tickets: Option<i32>,
    pub default_location: Option<String>,
    pub image_upload_size_limit: Option<i64>,
    pub allowed_image_types: Option<Vec<String>>,
    pub min_title_length: Option<i32>,
    pub max_title_length: Option<i32>,
    pub min_description_length: Option<i32>,
    pub max_description_length: Option<i32>,
    pub api_base_url: Option<String>,
    pub default_page_size: Option<i32>,
    pub search_filters: Option<SearchFilterConfig>,
}

const SELECT_COLUMNS: &str = "event_categories, event_statuses, time_format, date_format, \
     min_price, max_price, currency_symbol, max_tickets, min_tickets, \
     default_location, image_upload_size_limit, allowed_image_types, \
     min_title_length, max_title_length, min_description_length, \
     max_description_length, api_base_url, default_page_size, \
     search_fields, sort_options, version, updated_at";

impl Configuration {
    /// Create the singleton row with schema defaults if it does not exist.
    /// Safe to call on every read.
    pub async fn ensure_single(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO configuration (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Load the singleton, creating it first if missing.
    pub async fn load(pool: &PgPool) -> Result<Configuration, sqlx::Error> {
        Self::ensure_single(pool).await?;
        let row: ConfigurationRow =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM configuration WHERE id = 1"))
                .fetch_one(pool)
                .await?;
        Ok(row.into())
    }

    /// Apply a whitelisted update and return the merged document.
    pub async fn apply_update(
        pool: &PgPool,
        update: ConfigurationUpdate,
    ) -> Result<Configuration, sqlx::Error> {
        Self::ensure_single(pool).await?;
        let (search_fields, sort_options) = match update.search_filters {
            Some(sf) => (Some(sf.fields), Some(sf.sort_options)),
            None => (None, None),
        };
        let row: ConfigurationRow = sqlx::query_as(&format!(
            "UPDATE configuration SET \
                 event_categories = COALESCE($1, event_categories), \
                 event_statuses = COALESCE($2, event_statuses), \
                 time_format = COALESCE($3, time_format), \
                 date_format = COALESCE($4, date_format), \
                 min_price = COALESCE($5, min_price), \
                 max_price = COALESCE($6, max_price), \
                 currency_symbol = COALESCE($7, currency_symbol), \
                 max_tickets = COALESCE($8, max_tickets), \
                 min_tickets = COALESCE($9, min_tickets), \
                 default_location = COALESCE($10, default_location), \
                 image_upload_size_limit = COALESCE($11, image_upload_size_limit), \
                 allowed_image_types = COALESCE($12, allowed_image_types), \
                 min_title_length = COALESCE($13, min_title_length), \
                 max_title_length = COALESCE($14, max_title_length), \
                 min_description_length = COALESCE($15, min_description_length), \
                 max_description_length = COALESCE($16, max_description_length), \
                 api_base_url = COALESCE($17, api_base_url), \
                 default_page_size = COALESCE($18, default_page_size), \
                 search_fields = COALESCE($19, search_fields), \
                 sort_options = COALESCE($20, sort_options), \
                 updated_at = NOW() \
             WHERE id = 1 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(update.event_categories)
        .bind(update.event_statuses)
        .bind(update.time_format)
        .bind(update.date_format)
        .bind(update.min_price)
        .bind(update.max_price)
        .bind(update.currency_symbol)
        .bind(update.max_tickets)
        .bind(update.min_tickets)
        .bind(update.default_location)
        .bind(update.image_upload_size_limit)
        .bind(update.allowed_image_types)
        .bind(update.min_title_length)
        .bind(update.max_title_length)
        .bind(update.min_description_length)
        .bind(update.max_description_length)
        .bind(update.api_base_url)
        .bind(update.default_page_size)
        .bind(search_fields)
        .bind(sort_options)
        .fetch_one(pool)
        .await?;
        Ok(row.into())
    }
}
