pub mod notifications;

use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use beacon_storage::StorageError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Error envelope shared by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always false
    pub success: bool,
    pub message: String,
}

/// Envelope for operations that only report a message (and sometimes a count).
#[derive(Serialize, ToSchema)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

pub fn json_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    (status, Json(body)).into_response()
}

pub fn message_response(status: StatusCode, message: String, count: Option<usize>) -> Response {
    json_response(
        status,
        MessageEnvelope {
            success: true,
            message,
            count,
        },
    )
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    json_response(
        status,
        ErrorEnvelope {
            success: false,
            message: message.to_string(),
        },
    )
}

pub fn internal_error_response() -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Maps a store failure to a response. Lookup misses become 404 with a
/// descriptive message; anything else is logged and reported as a bare 500.
pub fn storage_error_response(trace_id: &str, action: &str, err: &StorageError) -> Response {
    match err {
        StorageError::NotFound { id, .. } => {
            tracing::warn!(trace_id = %trace_id, id = %id, "{action}: notification not found");
            error_response(StatusCode::NOT_FOUND, "Notification not found")
        }
        StorageError::Empty { .. } => {
            tracing::warn!(trace_id = %trace_id, "{action}: no notifications found");
            error_response(StatusCode::NOT_FOUND, "No notifications found")
        }
        _ => {
            tracing::error!(trace_id = %trace_id, error = %err, "{action} failed");
            internal_error_response()
        }
    }
}

/// Decodes a JSON request body. An empty body or a literal `null` decodes as
/// `T::default()`.
pub fn parse_json_body<T>(trace_id: &str, body: &Bytes) -> Result<T, Response>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice::<Option<T>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            tracing::warn!(trace_id = %trace_id, error = %e, "Rejected request body");
            error_response(StatusCode::BAD_REQUEST, &format!("Invalid request body: {e}"))
        })
}

/// Unwraps a `{id}` path segment, turning a rejection into the error envelope.
pub fn path_id(
    trace_id: &str,
    path: Result<Path<String>, PathRejection>,
) -> Result<String, Response> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::warn!(trace_id = %trace_id, error = %rejection, "Rejected path parameter");
        error_response(
            rejection.status(),
            &format!("Invalid notification id: {}", rejection.body_text()),
        )
    })
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}

/// Liveness payload.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    success: bool,
    status: String,
    message: String,
    timestamp: DateTime<Utc>,
    /// Service version
    version: String,
    uptime_secs: i64,
}

/// Service liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = Utc::now();
    json_response(
        StatusCode::OK,
        HealthResponse {
            success: true,
            status: "healthy".to_string(),
            message: "Notification service is running".to_string(),
            timestamp: now,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: (now - state.start_time).num_seconds(),
        },
    )
}

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .merge(notifications::notification_routes())
}
