//! 通知日志 handlers
//!
//! - GET /api/notifications
//! - DELETE /api/notifications（可选 `?key=&value=` 按属性清除）
//! - POST /api/notifications/read-all
//! - POST /api/notifications/{id}/read
//! - GET /api/notifications/toast
//! - POST /api/notifications/toast/dismiss
//! - POST /api/notifications/ingest

use crate::AppState;
use crate::utils::response::{
    bad_request_error, log_entry_to_dto, not_found_error, notification_error, notification_list,
};
use crate::utils::validation::normalize_optional;
use api_contract::{
    ApiResponse, ClearNotificationsQuery, ClearResultDto, DismissResultDto, IngestResultDto,
    ToastDto,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dash_notification::ingest_message;
use tracing::info;

#[derive(serde::Deserialize)]
pub struct EntryPath {
    entry_id: String,
}

/// 列出通知（最新在前）与未读数
pub async fn list_notifications(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success(notification_list(&state.store))),
    )
        .into_response()
}

/// 全部标记为已读
pub async fn mark_all_notifications_read(State(state): State<AppState>) -> Response {
    state.store.mark_all_read();
    (
        StatusCode::OK,
        Json(ApiResponse::success(notification_list(&state.store))),
    )
        .into_response()
}

/// 单条标记为已读
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(path): Path<EntryPath>,
) -> Response {
    if !state.store.mark_read(&path.entry_id) {
        return not_found_error();
    }
    (
        StatusCode::OK,
        Json(ApiResponse::success(notification_list(&state.store))),
    )
        .into_response()
}

/// 清除通知：无参数时全部清除，否则按 `attributes[key] == value` 清除
pub async fn clear_notifications(
    State(state): State<AppState>,
    Query(query): Query<ClearNotificationsQuery>,
) -> Response {
    let key = match normalize_optional(query.key, "key") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let removed = match (key, query.value) {
        (None, None) => state.store.clear_all(),
        (Some(key), Some(value)) => state.store.clear_by_attribute_eq(&key, &value),
        (None, Some(_)) => return bad_request_error("key required"),
        (Some(_), None) => return bad_request_error("value required"),
    };
    info!(target: "dash.notification", removed = removed, "notifications_cleared");
    (
        StatusCode::OK,
        Json(ApiResponse::success(ClearResultDto { removed })),
    )
        .into_response()
}

/// 当前 Toast
pub async fn get_toast(State(state): State<AppState>) -> Response {
    let entry = state.toast.visible().map(log_entry_to_dto);
    (StatusCode::OK, Json(ApiResponse::success(ToastDto { entry }))).into_response()
}

/// 关闭当前 Toast（不影响历史与已读状态）
pub async fn dismiss_toast(State(state): State<AppState>) -> Response {
    let dismissed = state.toast.dismiss();
    (
        StatusCode::OK,
        Json(ApiResponse::success(DismissResultDto { dismissed })),
    )
        .into_response()
}

/// 接入服务端 `log_notification` 报文
pub async fn ingest_notification(State(state): State<AppState>, body: String) -> Response {
    match ingest_message(&state.store, &body) {
        Ok(entry_id) => (
            StatusCode::OK,
            Json(ApiResponse::success(IngestResultDto { entry_id })),
        )
            .into_response(),
        Err(err) => notification_error(err),
    }
}
