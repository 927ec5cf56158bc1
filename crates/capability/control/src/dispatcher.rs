//! 批量命令下发器
//!
//! 流程：校验 → 空批次短路 → 单飞保护 → 批次任务（每目标一个任务并发执行 →
//! 等待全部任务 → 统计 → 有失败时写入一条通知日志）。

use crate::error::ControlError;
use crate::invoker::DeviceControlInvoker;
use crate::tally::ResultTally;
use dash_message::{CommandDescription, Locale, MessageFormatter};
use dash_notification::NotificationLogStore;
use dash_telemetry::{
    record_batch_coalesced, record_batch_dispatched, record_dispatch_latency_ms,
    record_target_outcomes,
};
use domain::{
    ATTR_COMPONENT, BatchClassification, BatchRequest, BatchTally, LogEntry, Outcome, Severity,
    Target,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 批量下发日志条目的默认组件名。
pub const DEFAULT_BULK_COMPONENT: &str = "BulkCommand";

/// 下发器配置。
#[derive(Debug, Clone)]
pub struct BulkDispatchConfig {
    /// 写入日志条目 `component` 属性的值，也是按组件清除时使用的键值。
    pub component: String,
    pub default_locale: Locale,
}

impl Default for BulkDispatchConfig {
    fn default() -> Self {
        Self {
            component: DEFAULT_BULK_COMPONENT.to_string(),
            default_locale: Locale::default(),
        }
    }
}

/// 一次下发的完整结果。
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub tally: BatchTally,
    pub classification: BatchClassification,
    /// 与请求中的目标顺序一致。
    pub outcomes: Vec<Outcome>,
    /// 因已有批次在执行而被合并（未执行）。
    pub coalesced: bool,
    /// 失败时写入的日志条目 ID。
    pub log_entry_id: Option<String>,
}

impl BatchReport {
    fn empty(coalesced: bool) -> Self {
        let tally = BatchTally::default();
        Self {
            tally,
            classification: tally.classification(),
            outcomes: Vec::new(),
            coalesced,
            log_entry_id: None,
        }
    }
}

/// 批量命令下发器。
pub struct BulkCommandDispatcher {
    core: Arc<DispatchCore>,
    in_flight: Arc<AtomicBool>,
}

/// 批次任务共享的只读部分。
struct DispatchCore {
    invoker: Arc<dyn DeviceControlInvoker>,
    store: Arc<NotificationLogStore>,
    formatter: MessageFormatter,
    config: BulkDispatchConfig,
}

impl BulkCommandDispatcher {
    pub fn new(
        invoker: Arc<dyn DeviceControlInvoker>,
        store: Arc<NotificationLogStore>,
        config: BulkDispatchConfig,
    ) -> Self {
        Self {
            core: Arc::new(DispatchCore {
                invoker,
                store,
                formatter: MessageFormatter::new(config.default_locale),
                config,
            }),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &BulkDispatchConfig {
        &self.core.config
    }

    /// 是否有批次正在执行。
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 下发并返回计数。
    pub async fn dispatch(&self, request: BatchRequest) -> Result<BatchTally, ControlError> {
        self.dispatch_report(request).await.map(|report| report.tally)
    }

    /// 下发并返回逐目标结果。
    ///
    /// 批次在独立任务中执行并持有单飞标记：调用方提前放弃等待时，
    /// 批次仍会执行完毕、写入失败日志，随后才释放标记。
    pub async fn dispatch_report(&self, request: BatchRequest) -> Result<BatchReport, ControlError> {
        validate_request(&request)?;
        if request.targets.is_empty() {
            debug!(
                target: "dash.control",
                command_key = %request.command_key,
                "bulk_dispatch_empty"
            );
            return Ok(BatchReport::empty(false));
        }
        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            record_batch_coalesced();
            info!(
                target: "dash.control",
                command_key = %request.command_key,
                target_count = request.targets.len(),
                "bulk_dispatch_coalesced"
            );
            return Ok(BatchReport::empty(true));
        };

        record_batch_dispatched();
        info!(
            target: "dash.control",
            command_key = %request.command_key,
            target_count = request.targets.len(),
            "bulk_dispatch_started"
        );
        let core = self.core.clone();
        let batch = tokio::spawn(async move {
            let _guard = guard;
            core.run(request).await
        });
        batch
            .await
            .map_err(|err| ControlError::Dispatch(format!("batch task failed: {err}")))
    }
}

impl DispatchCore {
    async fn run(&self, request: BatchRequest) -> BatchReport {
        let started_at = Instant::now();
        let outcomes = self.fan_out(&request).await;
        let result = ResultTally::from_outcomes(&outcomes);
        let tally = result.tally();
        record_target_outcomes(tally.success_count as u64, tally.failure_count as u64);
        let latency_ms = started_at.elapsed().as_millis() as u64;
        record_dispatch_latency_ms(latency_ms);

        let log_entry_id = if tally.failure_count > 0 {
            Some(self.record_failures(&request, &tally, result.failed_targets()))
        } else {
            None
        };
        info!(
            target: "dash.control",
            command_key = %request.command_key,
            total = tally.total,
            success_count = tally.success_count,
            failure_count = tally.failure_count,
            latency_ms = latency_ms,
            "bulk_dispatch_completed"
        );

        BatchReport {
            tally,
            classification: tally.classification(),
            outcomes,
            coalesced: false,
            log_entry_id,
        }
    }

    async fn fan_out(&self, request: &BatchRequest) -> Vec<Outcome> {
        let handles: Vec<(Target, JoinHandle<Result<(), ControlError>>)> = request
            .targets
            .iter()
            .map(|target| {
                let invoker = self.invoker.clone();
                let unit_target = target.clone();
                let command_key = request.command_key.clone();
                let command_value = request.command_value.clone();
                let handle = tokio::spawn(async move {
                    invoker
                        .invoke(&unit_target, &command_key, &command_value)
                        .await
                });
                (target.clone(), handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (target, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(())) => Outcome::success(target),
                Ok(Err(err)) => {
                    warn!(
                        target: "dash.control",
                        command_target = %target,
                        command_key = %request.command_key,
                        error = %err,
                        "bulk_dispatch_target_failed"
                    );
                    Outcome::failure(target, err.to_string())
                }
                Err(err) => {
                    warn!(
                        target: "dash.control",
                        command_target = %target,
                        command_key = %request.command_key,
                        error = %err,
                        "bulk_dispatch_target_aborted"
                    );
                    Outcome::failure(target, format!("invoke task failed: {err}"))
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    fn record_failures(
        &self,
        request: &BatchRequest,
        tally: &BatchTally,
        failed_targets: &[Target],
    ) -> String {
        let locale = Locale::resolve(request.locale.as_deref(), self.formatter.default_locale());
        let command = CommandDescription::new(request.display_label())
            .with_value(request.command_value.clone());
        let message = self.formatter.format(locale, &command, tally);
        let severity = if tally.success_count == 0 {
            Severity::Error
        } else {
            Severity::Warn
        };
        let failed: Vec<serde_json::Value> = failed_targets
            .iter()
            .map(|target| serde_json::Value::String(target.to_string()))
            .collect();
        let entry = LogEntry::new(severity, message)
            .with_attribute(ATTR_COMPONENT, self.config.component.clone())
            .with_attribute("commandKey", request.command_key.clone())
            .with_attribute("commandValue", request.command_value.clone())
            .with_attribute("total", tally.total)
            .with_attribute("successCount", tally.success_count)
            .with_attribute("failureCount", tally.failure_count)
            .with_attribute("failedTargets", failed)
            .with_attribute("locale", locale.as_str());
        let entry_id = entry.id.clone();
        self.store.insert(entry);
        entry_id
    }
}

/// 由批次任务持有；任务结束（含 panic 展开）时释放。
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn validate_request(request: &BatchRequest) -> Result<(), ControlError> {
    if request.command_key.trim().is_empty() {
        return Err(ControlError::InvalidRequest("command key is empty".to_string()));
    }
    if request.command_value.is_null() {
        return Err(ControlError::InvalidRequest("command value is missing".to_string()));
    }
    if let Some(index) = request
        .targets
        .iter()
        .position(|target| target.as_str().trim().is_empty())
    {
        return Err(ControlError::InvalidRequest(format!(
            "target at index {} is empty",
            index
        )));
    }
    Ok(())
}
