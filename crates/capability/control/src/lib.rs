//! # Dashboard Control 模块
//!
//! 批量命令下发：
//!
//! - [`invoker`]：单个目标的控制调用抽象（`DeviceControlInvoker`）与空实现
//! - [`mqtt`]：基于 MQTT 发布的调用实现
//! - [`tally`]：逐目标结果统计
//! - [`dispatcher`]：并发扇出、单飞保护、失败写入通知日志
//!
//! ## 单飞保护
//!
//! 同一下发器同一时刻只执行一个批次；批次进行中到达的请求直接返回零计数，
//! 不排队、不报错。

pub mod dispatcher;
pub mod error;
pub mod invoker;
pub mod mqtt;
pub mod tally;

pub use dispatcher::{BatchReport, BulkCommandDispatcher, BulkDispatchConfig, DEFAULT_BULK_COMPONENT};
pub use error::ControlError;
pub use invoker::{DeviceControlInvoker, NoopInvoker};
pub use mqtt::{MqttInvoker, MqttInvokerConfig};
pub use tally::ResultTally;
