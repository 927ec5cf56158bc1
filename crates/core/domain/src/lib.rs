pub mod batch;
pub mod log;

pub use batch::{BatchClassification, BatchRequest, BatchTally, CommandValue, Outcome, Target};
pub use log::{ATTR_COMPONENT, DEFAULT_LOG_CAPACITY, Attributes, LogEntry, Severity};

/// 当前时间（epoch 毫秒）。
pub fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}
