//! # Dashboard Notification 模块
//!
//! 面向操作员的通知日志：
//!
//! - [`store`]：有界、最新在前的日志历史，已读/未读管理，同步变更通知
//! - [`toast`]：Toast 可见性（WARN 到期自动隐藏，ERROR 需手动关闭）
//! - [`ingest`]：接收服务端推送的 `log_notification` 报文
//!
//! ## 历史与 Toast 的区别
//!
//! Toast 隐藏或关闭只影响“当前展示”，条目仍保留在历史中，
//! 直到被显式清除或因容量上限被淘汰（最旧的先淘汰）。
//! 容量淘汰是唯一的静默丢弃路径，属于策略行为而非错误。

pub mod error;
pub mod ingest;
pub mod store;
pub mod toast;

pub use error::NotificationError;
pub use ingest::{SERVER_COMPONENT, entry_from_notification, ingest_message, ingest_payload};
pub use store::{
    DEFAULT_LOG_CAPACITY, LogChange, LogSnapshot, NotificationLogStore, SubscriptionId,
};
pub use toast::{DEFAULT_TOAST_AUTO_HIDE, ToastConfig, ToastPresenter};
