//! 应用运行配置加载。

use std::env;

pub use domain::DEFAULT_LOG_CAPACITY;

/// WARN Toast 默认自动隐藏延迟（毫秒）。
pub const DEFAULT_TOAST_AUTO_HIDE_MS: u64 = 5_000;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub log_capacity: usize,
    pub toast_auto_hide_ms: u64,
    pub default_locale: String,
    pub bulk_component: String,
    pub control_enabled: bool,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_command_topic_prefix: String,
    pub mqtt_command_qos: u8,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("DASH_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let log_capacity = read_usize_with_default("DASH_LOG_CAPACITY", DEFAULT_LOG_CAPACITY)?;
        if log_capacity == 0 {
            return Err(ConfigError::Invalid(
                "DASH_LOG_CAPACITY".to_string(),
                "0".to_string(),
            ));
        }
        let toast_auto_hide_ms =
            read_u64_with_default("DASH_TOAST_AUTO_HIDE_MS", DEFAULT_TOAST_AUTO_HIDE_MS)?;
        let default_locale = read_optional("DASH_DEFAULT_LOCALE").unwrap_or_else(|| "en".to_string());
        let bulk_component =
            read_optional("DASH_BULK_COMPONENT").unwrap_or_else(|| "BulkCommand".to_string());
        let control_enabled = read_bool_with_default("DASH_CONTROL", false);
        let mqtt_host = env::var("DASH_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("DASH_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("DASH_MQTT_USERNAME");
        let mqtt_password = read_optional("DASH_MQTT_PASSWORD");
        let mqtt_command_topic_prefix = env::var("DASH_MQTT_COMMAND_TOPIC_PREFIX")
            .unwrap_or_else(|_| "dash/commands".to_string());
        let mqtt_command_qos = read_u8_with_default("DASH_MQTT_COMMAND_QOS", 1)?;

        Ok(Self {
            http_addr,
            log_capacity,
            toast_auto_hide_ms,
            default_locale,
            bulk_component,
            control_enabled,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_command_topic_prefix,
            mqtt_command_qos,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u8_with_default(key: &str, default: u8) -> Result<u8, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
