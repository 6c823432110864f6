use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// One itemized validation failure, keyed by the wire-level field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ValidationBody<'a> {
    errors: &'a [FieldError],
}

#[derive(Serialize)]
struct FaultBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// HTTP 400 with itemized field errors.
pub fn validation_failure(errors: &[FieldError]) -> Response {
    (StatusCode::BAD_REQUEST, Json(ValidationBody { errors })).into_response()
}

/// A `{error: ...}` body with the given status. `detail` carries internal
/// context and is only populated outside production.
pub fn fault(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Response {
    (
        status,
        Json(FaultBody {
            error: error.into(),
            detail,
        }),
    )
        .into_response()
}

/// Plain confirmation body for mutations that return no document.
pub fn message(text: impl Into<String>) -> Json<MessageBody> {
    Json(MessageBody {
        message: text.into(),
    })
}
