//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health
//! - 批量命令：/api/bulk-commands
//! - 通知日志：/api/notifications/*
//! - 指标快照：/api/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/bulk-commands", post(create_bulk_command))
        .route(
            "/api/notifications",
            get(list_notifications).delete(clear_notifications),
        )
        .route(
            "/api/notifications/read-all",
            post(mark_all_notifications_read),
        )
        .route(
            "/api/notifications/:entry_id/read",
            post(mark_notification_read),
        )
        .route("/api/notifications/toast", get(get_toast))
        .route("/api/notifications/toast/dismiss", post(dismiss_toast))
        .route("/api/notifications/ingest", post(ingest_notification))
        .route("/api/metrics", get(get_metrics))
}
