//! 追踪、请求 ID 与进程内计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 进程内计数器。
pub struct TelemetryMetrics {
    batches_dispatched: AtomicU64,
    batches_coalesced: AtomicU64,
    target_success: AtomicU64,
    target_failure: AtomicU64,
    dispatch_latency_ms_total: AtomicU64,
    dispatch_latency_ms_count: AtomicU64,
    log_entries_inserted: AtomicU64,
    log_entries_evicted: AtomicU64,
    log_notifications_ingested: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            batches_dispatched: AtomicU64::new(0),
            batches_coalesced: AtomicU64::new(0),
            target_success: AtomicU64::new(0),
            target_failure: AtomicU64::new(0),
            dispatch_latency_ms_total: AtomicU64::new(0),
            dispatch_latency_ms_count: AtomicU64::new(0),
            log_entries_inserted: AtomicU64::new(0),
            log_entries_evicted: AtomicU64::new(0),
            log_notifications_ingested: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            batches_coalesced: self.batches_coalesced.load(Ordering::Relaxed),
            target_success: self.target_success.load(Ordering::Relaxed),
            target_failure: self.target_failure.load(Ordering::Relaxed),
            dispatch_latency_ms_total: self.dispatch_latency_ms_total.load(Ordering::Relaxed),
            dispatch_latency_ms_count: self.dispatch_latency_ms_count.load(Ordering::Relaxed),
            log_entries_inserted: self.log_entries_inserted.load(Ordering::Relaxed),
            log_entries_evicted: self.log_entries_evicted.load(Ordering::Relaxed),
            log_notifications_ingested: self
                .log_notifications_ingested
                .load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录批次下发次数（不含被合并的重复触发）。
pub fn record_batch_dispatched() {
    metrics().batches_dispatched.fetch_add(1, Ordering::Relaxed);
}

/// 记录因单飞保护被合并的批次。
pub fn record_batch_coalesced() {
    metrics().batches_coalesced.fetch_add(1, Ordering::Relaxed);
}

/// 记录目标执行结果。
pub fn record_target_outcomes(success: u64, failure: u64) {
    let metrics = metrics();
    metrics.target_success.fetch_add(success, Ordering::Relaxed);
    metrics.target_failure.fetch_add(failure, Ordering::Relaxed);
}

/// 记录批次耗时（毫秒，从扇出到全部完成）。
pub fn record_dispatch_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .dispatch_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .dispatch_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录日志条目写入次数。
pub fn record_log_entry_inserted() {
    metrics().log_entries_inserted.fetch_add(1, Ordering::Relaxed);
}

/// 记录容量淘汰的日志条目数。
pub fn record_log_entries_evicted(count: u64) {
    metrics()
        .log_entries_evicted
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录服务端 log_notification 接收次数。
pub fn record_log_notification_ingested() {
    metrics()
        .log_notifications_ingested
        .fetch_add(1, Ordering::Relaxed);
}
