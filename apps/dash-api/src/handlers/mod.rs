//! Handlers 模块

pub mod bulk_commands;
pub mod health;
pub mod metrics;
pub mod notifications;

pub use bulk_commands::*;
pub use health::*;
pub use metrics::*;
pub use notifications::*;
