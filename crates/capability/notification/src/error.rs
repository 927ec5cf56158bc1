/// 通知模块错误。
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("payload error: {0}")]
    Payload(String),
    #[error("unsupported message type: {0}")]
    UnsupportedMessage(String),
    #[error("no async runtime available for toast timers")]
    NoRuntime,
}
