//! 批量命令 handlers
//!
//! - POST /api/bulk-commands

use crate::AppState;
use crate::utils::response::{batch_report_to_dto, control_error};
use crate::utils::validation::{normalize_optional, normalize_required};
use api_contract::{ApiResponse, BulkCommandRequest};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{BatchRequest, Target};

/// 批量下发命令
pub async fn create_bulk_command(
    State(state): State<AppState>,
    Json(req): Json<BulkCommandRequest>,
) -> Response {
    let command_key = match normalize_required(req.command_key, "commandKey") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let locale = match normalize_optional(req.locale, "locale") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let mut request = BatchRequest::new(
        req.targets.into_iter().map(Target::from).collect(),
        command_key,
        req.command_value,
    );
    request.label = req.label;
    request.locale = locale;

    match state.dispatcher.dispatch_report(request).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiResponse::success(batch_report_to_dto(report))),
        )
            .into_response(),
        Err(err) => control_error(err),
    }
}
