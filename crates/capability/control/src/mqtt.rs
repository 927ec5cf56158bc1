use crate::error::ControlError;
use crate::invoker::DeviceControlInvoker;
use async_trait::async_trait;
use domain::{CommandValue, Target, now_epoch_ms};
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::time::Duration;
use tracing::{debug, warn};

/// MQTT 调用器配置。
#[derive(Debug, Clone)]
pub struct MqttInvokerConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 命令 topic 前缀，实际 topic 为 `{prefix}/{target}`（target 可包含多段）。
    pub command_topic_prefix: String,
    pub qos: u8,
}

/// MQTT 调用器：每个目标发布一条命令，发布成功即视为该目标成功。
#[derive(Clone)]
pub struct MqttInvoker {
    client: AsyncClient,
    command_topic_prefix: String,
    qos: QoS,
}

impl MqttInvoker {
    pub fn connect(
        config: MqttInvokerConfig,
    ) -> Result<(Self, tokio::task::JoinHandle<()>), ControlError> {
        if config.host.trim().is_empty() {
            return Err(ControlError::Dispatch("mqtt host is empty".to_string()));
        }
        let client_id = format!("dash-control-{}", uuid::Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, config.host, config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (config.username, config.password) {
            options.set_credentials(username, password);
        }
        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let handle = tokio::spawn(async move {
            loop {
                if let Err(err) = eventloop.poll().await {
                    warn!(target: "dash.control", "mqtt eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });
        Ok((
            Self {
                client,
                command_topic_prefix: config.command_topic_prefix,
                qos: qos_from_u8(config.qos),
            },
            handle,
        ))
    }
}

#[async_trait]
impl DeviceControlInvoker for MqttInvoker {
    async fn invoke(
        &self,
        target: &Target,
        command_key: &str,
        command_value: &CommandValue,
    ) -> Result<(), ControlError> {
        let topic = command_topic(&self.command_topic_prefix, target);
        let payload = command_payload(target, command_key, command_value, now_epoch_ms())?;
        debug!(
            target: "dash.control",
            command_target = %target,
            command_key = %command_key,
            topic = %topic,
            payload_size = payload.len(),
            "command_publish"
        );
        self.client
            .publish(topic, self.qos, false, payload)
            .await
            .map_err(|err| ControlError::Invoke(err.to_string()))
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct CommandEnvelope<'a> {
    command_key: &'a str,
    command_value: &'a CommandValue,
    target: &'a str,
    issued_at_ms: i64,
}

fn command_topic(prefix: &str, target: &Target) -> String {
    let prefix = prefix.trim_end_matches('/');
    let target = target.as_str().trim_matches('/');
    format!("{}/{}", prefix, target)
}

fn command_payload(
    target: &Target,
    command_key: &str,
    command_value: &CommandValue,
    issued_at_ms: i64,
) -> Result<Vec<u8>, ControlError> {
    let envelope = CommandEnvelope {
        command_key,
        command_value,
        target: target.as_str(),
        issued_at_ms,
    };
    serde_json::to_vec(&envelope).map_err(|err| ControlError::Payload(err.to_string()))
}

fn qos_from_u8(value: u8) -> QoS {
    match value {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}
