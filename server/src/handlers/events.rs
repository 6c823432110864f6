use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::configuration::Configuration;
use crate::models::event::{Event, EventInput, EventRow, DEFAULT_STATUS};
use crate::search::filters::{self, SearchRequest};
use crate::search::{executor, query, SearchResults};
use crate::utils::auth::{AuthUser, MaybeAuthUser};
use crate::utils::error::{AppError, FieldError};
use crate::utils::response::{message, MessageBody};
use crate::AppState;

/// `POST /api/events/search`. Query-string parameters are also accepted
/// and override body fields, mirroring the GET variant.
pub async fn search_events_post(
    State(state): State<AppState>,
    Query(overrides): Query<SearchRequest>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    body: Option<Json<SearchRequest>>,
) -> Result<Json<SearchResults>, AppError> {
    let base = body.map(|Json(b)| b).unwrap_or_default();
    run_search(&state, base.overlay(overrides), viewer).await
}

/// `GET /api/events/search`, kept for backward compatibility.
pub async fn search_events_get(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<SearchResults>, AppError> {
    run_search(&state, request, viewer).await
}

async fn run_search(
    state: &AppState,
    request: SearchRequest,
    viewer: Option<Uuid>,
) -> Result<Json<SearchResults>, AppError> {
    // The configured category list is the validation source; search must
    // accept exactly what configuration advertises.
    let config = Configuration::load(&state.pool).await?;
    let filters =
        filters::validate(request, &config.event_categories).map_err(AppError::Validation)?;
    let results = executor::execute(&state.pool, &filters, viewer).await?;
    Ok(Json(results))
}

/// `GET /api/events`: upcoming events, soonest first.
pub async fn list_upcoming(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Vec<Event>>, AppError> {
    let mut qb = query::base_select(viewer);
    qb.push(" WHERE e.status = ");
    qb.push_bind(DEFAULT_STATUS);
    qb.push(" AND e.date >= CURRENT_DATE ORDER BY e.date ASC, e.start_time ASC");
    let rows: Vec<EventRow> = qb.build_query_as().fetch_all(&state.pool).await?;
    Ok(Json(rows.into_iter().map(Event::from).collect()))
}

/// `GET /api/events/category/:category`.
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Vec<Event>>, AppError> {
    let mut qb = query::base_select(viewer);
    qb.push(" WHERE e.category = ");
    qb.push_bind(category);
    qb.push(" ORDER BY e.date ASC");
    let rows: Vec<EventRow> = qb.build_query_as().fetch_all(&state.pool).await?;
    Ok(Json(rows.into_iter().map(Event::from).collect()))
}

/// `GET /api/events/:id`.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<Json<Event>, AppError> {
    fetch_event(&state, id, viewer)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Event".to_string()))
}

async fn fetch_event(
    state: &AppState,
    id: Uuid,
    viewer: Option<Uuid>,
) -> Result<Option<Event>, AppError> {
    let mut qb = query::base_select(viewer);
    qb.push(" WHERE e.id = ");
    qb.push_bind(id);
    let row: Option<EventRow> = qb.build_query_as().fetch_optional(&state.pool).await?;
    Ok(row.map(Event::from))
}

/// Validated create/update payload.
#[derive(Debug)]
struct ValidEvent {
    title: String,
    description: String,
    location: String,
    date: chrono::NaiveDate,
    start_time: String,
    end_time: String,
    category: String,
    image_url: Option<String>,
    tickets_available: i32,
    price: Decimal,
    status: String,
}

fn parse_clock(s: &str) -> Option<String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

fn validate_input(input: EventInput, config: &Configuration) -> Result<ValidEvent, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = input.title.unwrap_or_default().trim().to_string();
    let min_title = config.min_title_length.max(0) as usize;
    let max_title = config.max_title_length.max(0) as usize;
    if title.chars().count() < min_title || title.chars().count() > max_title {
        errors.push(FieldError::new(
            "title",
            format!("Title must be between {min_title} and {max_title} characters"),
        ));
    }

    let description = input.description.unwrap_or_default().trim().to_string();
    let min_desc = config.min_description_length.max(0) as usize;
    let max_desc = config.max_description_length.max(0) as usize;
    if description.chars().count() < min_desc || description.chars().count() > max_desc {
        errors.push(FieldError::new(
            "description",
            format!("Description must be between {min_desc} and {max_desc} characters"),
        ));
    }

    let location = input.location.unwrap_or_default().trim().to_string();
    if location.chars().count() < 3 {
        errors.push(FieldError::new(
            "location",
            "Location must be at least 3 characters",
        ));
    }

    let date = match input.date.as_deref().and_then(filters::parse_iso_date) {
        Some(d) => d,
        None => {
            errors.push(FieldError::new("date", "Date must be a valid ISO date"));
            chrono::NaiveDate::default()
        }
    };

    let start_time = match input.start_time.as_deref().and_then(parse_clock) {
        Some(t) => t,
        None => {
            errors.push(FieldError::new(
                "startTime",
                "Start time must be in HH:mm format",
            ));
            String::new()
        }
    };
    let end_time = match input.end_time.as_deref().and_then(parse_clock) {
        Some(t) => t,
        None => {
            errors.push(FieldError::new(
                "endTime",
                "End time must be in HH:mm format",
            ));
            String::new()
        }
    };

    let category = input.category.unwrap_or_default().trim().to_string();
    if !config.event_categories.iter().any(|c| *c == category) {
        errors.push(FieldError::new("category", "Invalid category"));
    }

    let tickets_available = match input.tickets_available {
        Some(n) if n >= 0 && n <= i64::from(config.max_tickets) => n as i32,
        _ => {
            errors.push(FieldError::new(
                "ticketsAvailable",
                "Tickets available must be a non-negative number",
            ));
            0
        }
    };

    let price = match input.price.and_then(Decimal::from_f64_retain) {
        Some(p) if p >= Decimal::ZERO => p,
        _ => {
            errors.push(FieldError::new(
                "price",
                "Price must be a non-negative number",
            ));
            Decimal::ZERO
        }
    };

    let status = input
        .status
        .unwrap_or_else(|| DEFAULT_STATUS.to_string())
        .trim()
        .to_string();
    if !config.event_statuses.iter().any(|s| *s == status) {
        errors.push(FieldError::new("status", "Invalid status"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ValidEvent {
        title,
        description,
        location,
        date,
        start_time,
        end_time,
        category,
        image_url: input.image_url,
        tickets_available,
        price,
        status,
    })
}

/// `POST /api/events` (auth).
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(organizer): AuthUser,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let config = Configuration::load(&state.pool).await?;
    let valid = validate_input(input, &config).map_err(AppError::Validation)?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO events (organizer_id, title, description, location, date, \
             start_time, end_time, category, image_url, tickets_available, price, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING id",
    )
    .bind(organizer)
    .bind(&valid.title)
    .bind(&valid.description)
    .bind(&valid.location)
    .bind(valid.date)
    .bind(&valid.start_time)
    .bind(&valid.end_time)
    .bind(&valid.category)
    .bind(&valid.image_url)
    .bind(valid.tickets_available)
    .bind(valid.price)
    .bind(&valid.status)
    .fetch_one(&state.pool)
    .await?;

    let event = fetch_event(&state, id, Some(organizer))
        .await?
        .ok_or_else(|| AppError::NotFound("Event".to_string()))?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn owned_event_id(state: &AppState, id: Uuid, user: Uuid) -> Result<Uuid, AppError> {
    let organizer: Option<Uuid> = sqlx::query_scalar("SELECT organizer_id FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    match organizer {
        None => Err(AppError::NotFound("Event".to_string())),
        Some(owner) if owner != user => {
            Err(AppError::Forbidden("not the organizer of this event".to_string()))
        }
        Some(_) => Ok(id),
    }
}

/// `PUT /api/events/:id` (auth + ownership).
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AuthUser(user): AuthUser,
    Json(input): Json<EventInput>,
) -> Result<Json<Event>, AppError> {
    owned_event_id(&state, id, user).await?;
    let config = Configuration::load(&state.pool).await?;
    let valid = validate_input(input, &config).map_err(AppError::Validation)?;

    sqlx::query(
        "UPDATE events SET title = $2, description = $3, location = $4, date = $5, \
             start_time = $6, end_time = $7, category = $8, image_url = $9, \
             tickets_available = $10, price = $11, status = $12, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&valid.title)
    .bind(&valid.description)
    .bind(&valid.location)
    .bind(valid.date)
    .bind(&valid.start_time)
    .bind(&valid.end_time)
    .bind(&valid.category)
    .bind(&valid.image_url)
    .bind(valid.tickets_available)
    .bind(valid.price)
    .bind(&valid.status)
    .execute(&state.pool)
    .await?;

    let event = fetch_event(&state, id, Some(user))
        .await?
        .ok_or_else(|| AppError::NotFound("Event".to_string()))?;
    Ok(Json(event))
}

/// `DELETE /api/events/:id` (auth + ownership).
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageBody>, AppError> {
    owned_event_id(&state, id, user).await?;
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    Ok(message("Event deleted successfully"))
}

#[derive(serde::Serialize)]
pub struct StarResponse {
    pub starred: bool,
}

/// `POST /api/events/:id/star` (auth). Starring is a per-user relation:
/// the toggle inserts or removes a row in `starred_events` and never
/// touches the event document.
pub async fn toggle_star(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AuthUser(user): AuthUser,
) -> Result<Json<StarResponse>, AppError> {
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Event".to_string()));
    }

    let removed = sqlx::query("DELETE FROM starred_events WHERE user_id = $1 AND event_id = $2")
        .bind(user)
        .bind(id)
        .execute(&state.pool)
        .await?
        .rows_affected();

    let starred = if removed == 0 {
        sqlx::query(
            "INSERT INTO starred_events (user_id, event_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user)
        .bind(id)
        .execute(&state.pool)
        .await?;
        true
    } else {
        false
    };

    Ok(Json(StarResponse { starred }))
}
