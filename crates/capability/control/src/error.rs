/// 控制链路错误。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invoke error: {0}")]
    Invoke(String),
    #[error("dispatch error: {0}")]
    Dispatch(String),
    #[error("payload error: {0}")]
    Payload(String),
}
