use crate::error::ControlError;
use async_trait::async_trait;
use domain::{CommandValue, Target};

/// 单个目标的控制调用。
///
/// 实现方负责自身的超时；返回 `Err` 即视为该目标失败。
#[async_trait]
pub trait DeviceControlInvoker: Send + Sync {
    async fn invoke(
        &self,
        target: &Target,
        command_key: &str,
        command_value: &CommandValue,
    ) -> Result<(), ControlError>;
}

/// 空调用器（未启用控制链路时使用）。
#[derive(Debug, Default)]
pub struct NoopInvoker;

#[async_trait]
impl DeviceControlInvoker for NoopInvoker {
    async fn invoke(
        &self,
        _target: &Target,
        _command_key: &str,
        _command_value: &CommandValue,
    ) -> Result<(), ControlError> {
        Ok(())
    }
}
