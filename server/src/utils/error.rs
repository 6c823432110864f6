use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::utils::response::{fault, validation_failure};

pub use crate::utils::response::FieldError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("authentication required: {0}")]
    Auth(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_production() -> bool {
    std::env::var("RUST_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => validation_failure(&errors),
            AppError::Auth(msg) => fault(StatusCode::UNAUTHORIZED, msg, None),
            AppError::Forbidden(msg) => fault(StatusCode::FORBIDDEN, msg, None),
            AppError::NotFound(what) => {
                fault(StatusCode::NOT_FOUND, format!("{what} not found"), None)
            }
            AppError::Database(e) => {
                error!(error = ?e, "database error");
                // The client gets a generic message; internal detail only
                // leaves the process outside production.
                let detail = (!is_production()).then(|| e.to_string());
                fault(StatusCode::INTERNAL_SERVER_ERROR, "Server error", detail)
            }
        }
    }
}
