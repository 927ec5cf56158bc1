use std::collections::BTreeMap;
use std::fmt;

/// 产生日志的组件属性键。
pub const ATTR_COMPONENT: &str = "component";

/// 通知日志默认保留条数。
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// 日志条目属性（顺序无关）。
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// 日志严重级别。
///
/// - WARN：Toast 到期自动隐藏
/// - ERROR：Toast 常驻，需要显式关闭
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warn,
}

impl Severity {
    /// 解析日志级别字符串；非 ERROR/WARN 级别返回 None。
    pub fn parse_level(level: &str) -> Option<Self> {
        match level.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Some(Self::Error),
            "WARN" | "WARNING" => Some(Self::Warn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 面向操作员的通知日志条目。
///
/// 创建后只有 `is_read` 会被修改。
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    pub created_at_ms: i64,
    pub attributes: Attributes,
    pub is_read: bool,
}

impl LogEntry {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self::with_timestamp(severity, message, crate::now_epoch_ms())
    }

    pub fn with_timestamp(severity: Severity, message: impl Into<String>, created_at_ms: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            severity,
            message: message.into(),
            created_at_ms,
            attributes: Attributes::new(),
            is_read: false,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn component(&self) -> Option<&str> {
        self.attribute(ATTR_COMPONENT).and_then(|value| value.as_str())
    }
}
