//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 批量命令请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCommandRequest {
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(alias = "command_key")]
    pub command_key: String,
    #[serde(alias = "command_value", default)]
    pub command_value: serde_json::Value,
    pub label: Option<String>,
    pub locale: Option<String>,
}

/// 批次计数返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTallyDto {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

/// 单个目标结果返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDto {
    pub target: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 批量命令返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReportDto {
    pub tally: BatchTallyDto,
    /// FULL_SUCCESS / PARTIAL_FAILURE / TOTAL_FAILURE
    pub classification: String,
    pub coalesced: bool,
    pub log_entry_id: Option<String>,
    pub outcomes: Vec<OutcomeDto>,
}

/// 通知日志条目返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryDto {
    pub id: String,
    /// ERROR / WARN
    pub severity: String,
    pub message: String,
    pub created_at_ms: i64,
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub is_read: bool,
}

/// 通知列表返回结构（铃铛/角标使用）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListDto {
    pub entries: Vec<LogEntryDto>,
    pub unread_count: usize,
}

/// 当前 Toast 返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastDto {
    pub entry: Option<LogEntryDto>,
}

/// 按属性清除的查询参数。
#[derive(Debug, Deserialize)]
pub struct ClearNotificationsQuery {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// 清除结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResultDto {
    pub removed: usize,
}

/// Toast 关闭结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissResultDto {
    pub dismissed: bool,
}

/// 日志通知接入结果（被忽略的级别返回 `entryId: null`）。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResultDto {
    pub entry_id: Option<String>,
}

/// 服务端推送的日志通知报文类型。
pub const LOG_NOTIFICATION_TYPE: &str = "log_notification";

/// 服务端推送消息（`{"type": ..., "payload": ...}`）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogNotificationMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub payload: LogNotificationPayload,
}

/// 服务端 WARN/ERROR 日志记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogNotificationPayload {
    pub level: String,
    pub message: String,
    /// RFC3339
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub batches_dispatched: u64,
    pub batches_coalesced: u64,
    pub target_success: u64,
    pub target_failure: u64,
    pub dispatch_latency_ms_total: u64,
    pub dispatch_latency_ms_count: u64,
    pub log_entries_inserted: u64,
    pub log_entries_evicted: u64,
    pub log_notifications_ingested: u64,
}
