use std::fmt;

/// 命令值（对核心不透明）。
pub type CommandValue = serde_json::Value;

/// 单个可控端点（设备 + 命令路径），按字符串值比较。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target(String);

impl Target {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 批量命令请求。
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub targets: Vec<Target>,
    pub command_key: String,
    pub command_value: CommandValue,
    /// 命令的人类可读名称（缺省使用 `command_key`）。
    pub label: Option<String>,
    /// 消息语言（缺省使用下发器默认语言）。
    pub locale: Option<String>,
}

impl BatchRequest {
    pub fn new(
        targets: Vec<Target>,
        command_key: impl Into<String>,
        command_value: CommandValue,
    ) -> Self {
        Self {
            targets,
            command_key: command_key.into(),
            command_value,
            label: None,
            locale: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// 用于消息展示的命令名称。
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.command_key)
    }
}

/// 单个目标的执行结果，每个批次内每个目标恰好一次。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub target: Target,
    pub ok: bool,
    pub error: Option<String>,
}

impl Outcome {
    pub fn success(target: Target) -> Self {
        Self {
            target,
            ok: true,
            error: None,
        }
    }

    pub fn failure(target: Target, error: impl Into<String>) -> Self {
        Self {
            target,
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// 批次分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchClassification {
    FullSuccess,
    PartialFailure,
    TotalFailure,
}

/// 批次计数。
///
/// 始终满足 `success_count + failure_count == total`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchTally {
    pub fn classification(&self) -> BatchClassification {
        if self.failure_count == 0 {
            BatchClassification::FullSuccess
        } else if self.success_count == 0 {
            BatchClassification::TotalFailure
        } else {
            BatchClassification::PartialFailure
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
