//! 批量操作结果的多语言消息。
//!
//! 纯函数：输入 (语言, 命令描述, 批次计数)，输出非空字符串。
//! 未知语言回退到默认语言。

use domain::{BatchClassification, BatchTally};
use std::fmt;

/// 支持的消息语言。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    /// 按主语言子标签解析（`ja`、`ja-JP`、`en_US` 等）。
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::En),
            "ja" => Some(Self::Ja),
            _ => None,
        }
    }

    /// 解析失败或未提供时使用默认语言。
    pub fn resolve(tag: Option<&str>, default: Locale) -> Self {
        tag.and_then(Self::parse).unwrap_or(default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 命令的人类可读描述。
#[derive(Debug, Clone)]
pub struct CommandDescription {
    pub label: String,
    pub value: Option<serde_json::Value>,
}

impl CommandDescription {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

struct Templates {
    full_success: &'static str,
    partial_failure: &'static str,
    total_failure: &'static str,
    on: &'static str,
    off: &'static str,
}

const EN: Templates = Templates {
    full_success: "{command}: all {total} devices succeeded",
    partial_failure: "{command}: {success} of {total} devices succeeded, {failure} failed",
    total_failure: "{command}: failed on all {total} devices ({success} succeeded, {failure} failed)",
    on: "ON",
    off: "OFF",
};

const JA: Templates = Templates {
    full_success: "{command}: {total}台すべて成功しました",
    partial_failure: "{command}: {total}台中{success}台成功、{failure}台失敗しました",
    total_failure: "{command}: {total}台すべて失敗しました（成功{success}台、失敗{failure}台）",
    on: "オン",
    off: "オフ",
};

fn templates(locale: Locale) -> &'static Templates {
    match locale {
        Locale::En => &EN,
        Locale::Ja => &JA,
    }
}

/// 批量结果消息格式化器。
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter {
    default_locale: Locale,
}

impl MessageFormatter {
    pub fn new(default_locale: Locale) -> Self {
        Self { default_locale }
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// 按语言标签格式化；未知标签使用默认语言。
    pub fn format_tag(&self, tag: Option<&str>, command: &CommandDescription, tally: &BatchTally) -> String {
        self.format(Locale::resolve(tag, self.default_locale), command, tally)
    }

    pub fn format(&self, locale: Locale, command: &CommandDescription, tally: &BatchTally) -> String {
        let templates = templates(locale);
        let template = match tally.classification() {
            BatchClassification::FullSuccess => templates.full_success,
            BatchClassification::PartialFailure => templates.partial_failure,
            BatchClassification::TotalFailure => templates.total_failure,
        };
        let command = command_text(templates, command);
        render(
            template,
            &[
                ("command", command),
                ("success", tally.success_count.to_string()),
                ("failure", tally.failure_count.to_string()),
                ("total", tally.total.to_string()),
            ],
        )
    }
}

fn command_text(templates: &Templates, command: &CommandDescription) -> String {
    let label = command.label.trim();
    match command.value.as_ref().map(|value| value_label(templates, value)) {
        Some(value) if label.is_empty() => value,
        Some(value) => format!("{label} {value}"),
        None => label.to_string(),
    }
}

fn value_label(templates: &Templates, value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Bool(true) => templates.on.to_string(),
        serde_json::Value::Bool(false) => templates.off.to_string(),
        serde_json::Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "on" | "true" => templates.on.to_string(),
            "off" | "false" => templates.off.to_string(),
            _ => text.clone(),
        },
        other => other.to_string(),
    }
}

/// 将 `{name}` 占位符替换为参数值，未知占位符保持原样。
fn render(template: &str, params: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
