use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub mod config;
pub mod events;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    Json(HealthPayload {
        status: "ok",
        service: "mela-api",
    })
    .into_response()
}
