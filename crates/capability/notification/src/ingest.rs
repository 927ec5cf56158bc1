//! 服务端 `log_notification` 报文接入
//!
//! 设备控制服务器会把自身的 WARN/ERROR 日志推送给所有面板，
//! 这里把它们转换为与批量下发失败相同形态的日志条目。

use crate::error::NotificationError;
use crate::store::NotificationLogStore;
use api_contract::{LOG_NOTIFICATION_TYPE, LogNotificationMessage, LogNotificationPayload};
use dash_telemetry::record_log_notification_ingested;
use domain::{ATTR_COMPONENT, LogEntry, Severity, now_epoch_ms};
use tracing::debug;

/// 未携带 component 属性时使用的组件名。
pub const SERVER_COMPONENT: &str = "Server";

/// 转换为日志条目；非 ERROR/WARN 级别返回 None。
pub fn entry_from_notification(payload: &LogNotificationPayload) -> Option<LogEntry> {
    let severity = Severity::parse_level(&payload.level)?;
    let created_at_ms = match payload.time.as_deref().map(parse_rfc3339_ms) {
        Some(Some(ts_ms)) => ts_ms,
        Some(None) => {
            debug!(
                target: "dash.notification",
                time = ?payload.time,
                "log_notification_time_invalid"
            );
            now_epoch_ms()
        }
        None => now_epoch_ms(),
    };
    let mut entry = LogEntry::with_timestamp(severity, payload.message.clone(), created_at_ms);
    entry.attributes = payload.attributes.clone();
    entry
        .attributes
        .entry(ATTR_COMPONENT.to_string())
        .or_insert_with(|| serde_json::Value::String(SERVER_COMPONENT.to_string()));
    Some(entry)
}

/// 写入一条服务端日志，返回新条目 ID（被忽略的级别返回 None）。
pub fn ingest_payload(store: &NotificationLogStore, payload: &LogNotificationPayload) -> Option<String> {
    let entry = entry_from_notification(payload)?;
    let id = entry.id.clone();
    store.insert(entry);
    record_log_notification_ingested();
    Some(id)
}

/// 解析原始 JSON 报文并写入。
pub fn ingest_message(store: &NotificationLogStore, raw: &str) -> Result<Option<String>, NotificationError> {
    let message: LogNotificationMessage =
        serde_json::from_str(raw).map_err(|err| NotificationError::Payload(err.to_string()))?;
    if message.message_type != LOG_NOTIFICATION_TYPE {
        return Err(NotificationError::UnsupportedMessage(message.message_type));
    }
    Ok(ingest_payload(store, &message.payload))
}

fn parse_rfc3339_ms(value: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}
