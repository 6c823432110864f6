use axum::extract::State;
use axum::Json;

use crate::models::configuration::{Configuration, ConfigurationUpdate};
use crate::search::filters::MAX_LIMIT;
use crate::utils::auth::AuthUser;
use crate::utils::error::{AppError, FieldError};
use crate::AppState;

/// `GET /api/config`, public. The singleton row is created with defaults
/// on first access, so this endpoint is idempotent and never 404s.
pub async fn get_configuration(
    State(state): State<AppState>,
) -> Result<Json<Configuration>, AppError> {
    let config = Configuration::load(&state.pool).await?;
    Ok(Json(config))
}

fn validate_update(update: &ConfigurationUpdate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if let Some(categories) = &update.event_categories {
        if categories.is_empty() || categories.iter().any(|c| c.trim().is_empty()) {
            errors.push(FieldError::new(
                "eventCategories",
                "Event categories must be a non-empty list of names",
            ));
        }
    }
    if let Some(statuses) = &update.event_statuses {
        if statuses.is_empty() {
            errors.push(FieldError::new(
                "eventStatuses",
                "Event statuses must not be empty",
            ));
        }
    }
    if let Some(size) = update.default_page_size {
        if size < 1 || size > MAX_LIMIT as i32 {
            errors.push(FieldError::new(
                "defaultPageSize",
                format!("Default page size must be between 1 and {MAX_LIMIT}"),
            ));
        }
    }
    if let Some(filters) = &update.search_filters {
        if filters.fields.is_empty() || filters.sort_options.is_empty() {
            errors.push(FieldError::new(
                "searchFilters",
                "Search filters need at least one field and one sort option",
            ));
        }
    }
    errors
}

/// `PUT /api/config` (auth): merges a whitelisted subset of fields and
/// returns the updated document.
pub async fn update_configuration(
    State(state): State<AppState>,
    AuthUser(_admin): AuthUser,
    Json(update): Json<ConfigurationUpdate>,
) -> Result<Json<Configuration>, AppError> {
    let errors = validate_update(&update);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let config = Configuration::apply_update(&state.pool, update).await?;
    Ok(Json(config))
}
