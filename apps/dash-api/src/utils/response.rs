//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, control_error, notification_error
//! - DTO 转换：log_entry_to_dto, notification_list, batch_report_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码对应。

use api_contract::{
    ApiResponse, BatchReportDto, BatchTallyDto, LogEntryDto, NotificationListDto, OutcomeDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dash_control::{BatchReport, ControlError};
use dash_notification::{NotificationError, NotificationLogStore};
use domain::{BatchClassification, BatchTally, LogEntry, Outcome};

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 控制链路错误响应
pub fn control_error(err: ControlError) -> Response {
    match err {
        ControlError::InvalidRequest(message) => bad_request_error(message),
        err => internal_error(err.to_string()),
    }
}

/// 通知接入错误响应
pub fn notification_error(err: NotificationError) -> Response {
    match err {
        NotificationError::Payload(message) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("INVALID.PAYLOAD", message)),
        )
            .into_response(),
        NotificationError::UnsupportedMessage(kind) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "UNSUPPORTED.MESSAGE",
                format!("unsupported message type: {kind}"),
            )),
        )
            .into_response(),
        err => internal_error(err.to_string()),
    }
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// LogEntry 转 LogEntryDto
pub fn log_entry_to_dto(entry: LogEntry) -> LogEntryDto {
    LogEntryDto {
        id: entry.id,
        severity: entry.severity.as_str().to_string(),
        message: entry.message,
        created_at_ms: entry.created_at_ms,
        attributes: entry.attributes,
        is_read: entry.is_read,
    }
}

/// 当前通知列表与未读数
pub fn notification_list(store: &NotificationLogStore) -> NotificationListDto {
    let entries: Vec<LogEntryDto> = store.entries().into_iter().map(log_entry_to_dto).collect();
    let unread_count = entries.iter().filter(|entry| !entry.is_read).count();
    NotificationListDto {
        entries,
        unread_count,
    }
}

/// BatchReport 转 BatchReportDto
pub fn batch_report_to_dto(report: BatchReport) -> BatchReportDto {
    BatchReportDto {
        tally: tally_to_dto(report.tally),
        classification: classification_label(report.classification).to_string(),
        coalesced: report.coalesced,
        log_entry_id: report.log_entry_id,
        outcomes: report.outcomes.into_iter().map(outcome_to_dto).collect(),
    }
}

fn tally_to_dto(tally: BatchTally) -> BatchTallyDto {
    BatchTallyDto {
        total: tally.total,
        success_count: tally.success_count,
        failure_count: tally.failure_count,
    }
}

fn outcome_to_dto(outcome: Outcome) -> OutcomeDto {
    OutcomeDto {
        target: outcome.target.to_string(),
        ok: outcome.ok,
        error: outcome.error,
    }
}

fn classification_label(classification: BatchClassification) -> &'static str {
    match classification {
        BatchClassification::FullSuccess => "FULL_SUCCESS",
        BatchClassification::PartialFailure => "PARTIAL_FAILURE",
        BatchClassification::TotalFailure => "TOTAL_FAILURE",
    }
}
