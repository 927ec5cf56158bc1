//! Telemetry 指标快照。
//!
//! - GET /api/metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dash_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            batches_dispatched: snapshot.batches_dispatched,
            batches_coalesced: snapshot.batches_coalesced,
            target_success: snapshot.target_success,
            target_failure: snapshot.target_failure,
            dispatch_latency_ms_total: snapshot.dispatch_latency_ms_total,
            dispatch_latency_ms_count: snapshot.dispatch_latency_ms_count,
            log_entries_inserted: snapshot.log_entries_inserted,
            log_entries_evicted: snapshot.log_entries_evicted,
            log_notifications_ingested: snapshot.log_notifications_ingested,
        })),
    )
        .into_response()
}
