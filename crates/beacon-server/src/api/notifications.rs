use crate::api::{
    json_response, message_response, parse_json_body, path_id, storage_error_response,
    ErrorEnvelope, MessageEnvelope,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use beacon_common::types::{
    NotificationInput, NotificationPatch, NotificationRecord, NotificationStats,
};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Single-record envelope.
#[derive(Serialize, ToSchema)]
pub struct NotificationEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub notification: NotificationRecord,
}

/// Full listing in insertion order.
#[derive(Serialize, ToSchema)]
pub struct NotificationListEnvelope {
    pub success: bool,
    pub count: usize,
    pub notifications: Vec<NotificationRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct StatsEnvelope {
    pub success: bool,
    pub stats: NotificationStats,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountEnvelope {
    pub success: bool,
    pub unread_count: usize,
}

fn record_response(
    status: StatusCode,
    message: Option<String>,
    record: NotificationRecord,
) -> Response {
    json_response(
        status,
        NotificationEnvelope {
            success: true,
            message,
            notification: record,
        },
    )
}

/// Store a new notification sent by the client.
///
/// `id` and `timestamp` are assigned by the server; values in the body are ignored.
#[utoipa::path(
    post,
    path = "/send-notification",
    tag = "Notifications",
    request_body = NotificationInput,
    responses(
        (status = 201, description = "Notification stored", body = NotificationEnvelope),
        (status = 400, description = "Malformed body", body = ErrorEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
async fn send_notification(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    let input: NotificationInput = match parse_json_body(&trace_id, &body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    match state.store.create(input) {
        Ok(record) => {
            tracing::info!(
                trace_id = %trace_id.0,
                id = %record.id,
                kind = %record.kind,
                "Notification saved"
            );
            record_response(
                StatusCode::CREATED,
                Some("Notification received and saved".to_string()),
                record,
            )
        }
        Err(e) => storage_error_response(&trace_id, "Send notification", &e),
    }
}

/// List every notification in insertion order.
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "All notifications", body = NotificationListEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
async fn list_notifications(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.list() {
        Ok(notifications) => json_response(
            StatusCode::OK,
            NotificationListEnvelope {
                success: true,
                count: notifications.len(),
                notifications,
            },
        ),
        Err(e) => storage_error_response(&trace_id, "List notifications", &e),
    }
}

/// Remove every notification.
#[utoipa::path(
    delete,
    path = "/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "Number of notifications removed", body = MessageEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
async fn clear_notifications(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.clear() {
        Ok(count) => {
            tracing::info!(trace_id = %trace_id.0, count, "Cleared notifications");
            message_response(
                StatusCode::OK,
                format!("Cleared {count} notifications"),
                Some(count),
            )
        }
        Err(e) => storage_error_response(&trace_id, "Clear notifications", &e),
    }
}

/// Most recently inserted notification. The client polls this endpoint.
#[utoipa::path(
    get,
    path = "/notifications/latest",
    tag = "Notifications",
    responses(
        (status = 200, description = "Latest notification", body = NotificationEnvelope),
        (status = 404, description = "Store is empty", body = ErrorEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
async fn latest_notification(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.latest() {
        Ok(record) => record_response(StatusCode::OK, None, record),
        Err(e) => storage_error_response(&trace_id, "Latest notification", &e),
    }
}

/// Counts by delivery status and type.
#[utoipa::path(
    get,
    path = "/notifications/stats",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notification statistics", body = StatsEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
async fn notification_stats(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.stats() {
        Ok(stats) => json_response(
            StatusCode::OK,
            StatsEnvelope {
                success: true,
                stats,
            },
        ),
        Err(e) => storage_error_response(&trace_id, "Notification stats", &e),
    }
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "Notifications",
    responses(
        (status = 200, description = "Number of notifications not yet displayed", body = UnreadCountEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
async fn unread_count(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.unread_count() {
        Ok(unread_count) => json_response(
            StatusCode::OK,
            UnreadCountEnvelope {
                success: true,
                unread_count,
            },
        ),
        Err(e) => storage_error_response(&trace_id, "Unread count", &e),
    }
}

#[utoipa::path(
    patch,
    path = "/notifications/read-all",
    tag = "Notifications",
    responses(
        (status = 200, description = "Number of notifications marked as read", body = MessageEnvelope),
        (status = 500, description = "Store failure", body = ErrorEnvelope)
    )
)]
async fn mark_all_read(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.mark_all_read() {
        Ok(count) => {
            tracing::info!(trace_id = %trace_id.0, count, "Marked all notifications as read");
            message_response(
                StatusCode::OK,
                "All notifications marked as read".to_string(),
                Some(count),
            )
        }
        Err(e) => storage_error_response(&trace_id, "Mark all read", &e),
    }
}

#[utoipa::path(
    get,
    path = "/notifications/{id}",
    tag = "Notifications",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification", body = NotificationEnvelope),
        (status = 400, description = "Invalid notification id", body = ErrorEnvelope),
        (status = 404, description = "Notification not found", body = ErrorEnvelope)
    )
)]
async fn get_notification(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> impl IntoResponse {
    let id = match path_id(&trace_id, id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.find(&id) {
        Ok(record) => record_response(StatusCode::OK, None, record),
        Err(e) => storage_error_response(&trace_id, "Get notification", &e),
    }
}

/// Partially update a notification. `id` and `timestamp` in the body are ignored;
/// `type` and `time` may be changed.
#[utoipa::path(
    patch,
    path = "/notifications/{id}",
    tag = "Notifications",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    request_body = NotificationPatch,
    responses(
        (status = 200, description = "Updated notification", body = NotificationEnvelope),
        (status = 400, description = "Malformed body or invalid id", body = ErrorEnvelope),
        (status = 404, description = "Notification not found", body = ErrorEnvelope)
    )
)]
async fn update_notification(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> impl IntoResponse {
    let id = match path_id(&trace_id, id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch: NotificationPatch = match parse_json_body(&trace_id, &body) {
        Ok(patch) => patch,
        Err(resp) => return resp,
    };
    match state.store.update(&id, &patch) {
        Ok(record) => {
            tracing::info!(trace_id = %trace_id.0, id = %id, "Notification updated");
            record_response(
                StatusCode::OK,
                Some(format!("Notification {id} updated successfully")),
                record,
            )
        }
        Err(e) => storage_error_response(&trace_id, "Update notification", &e),
    }
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "Notifications",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification deleted", body = MessageEnvelope),
        (status = 400, description = "Invalid notification id", body = ErrorEnvelope),
        (status = 404, description = "Notification not found", body = ErrorEnvelope)
    )
)]
async fn delete_notification(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> impl IntoResponse {
    let id = match path_id(&trace_id, id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.delete(&id) {
        Ok(()) => {
            tracing::info!(trace_id = %trace_id.0, id = %id, "Notification deleted");
            message_response(
                StatusCode::OK,
                format!("Notification {id} deleted successfully"),
                None,
            )
        }
        Err(e) => storage_error_response(&trace_id, "Delete notification", &e),
    }
}

#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    tag = "Notifications",
    params(
        ("id" = String, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = NotificationEnvelope),
        (status = 400, description = "Invalid notification id", body = ErrorEnvelope),
        (status = 404, description = "Notification not found", body = ErrorEnvelope)
    )
)]
async fn mark_read(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> impl IntoResponse {
    let id = match path_id(&trace_id, id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.mark_read(&id) {
        Ok(record) => record_response(
            StatusCode::OK,
            Some(format!("Notification {id} marked as read")),
            record,
        ),
        Err(e) => storage_error_response(&trace_id, "Mark read", &e),
    }
}

pub fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(send_notification))
        .routes(routes!(list_notifications, clear_notifications))
        .routes(routes!(latest_notification))
        .routes(routes!(notification_stats))
        .routes(routes!(unread_count))
        .routes(routes!(mark_all_read))
        .routes(routes!(get_notification, update_notification, delete_notification))
        .routes(routes!(mark_read))
}
