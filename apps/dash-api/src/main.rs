//! 控制面板 HTTP API：批量命令下发、通知日志、Toast 与指标。

mod handlers;
mod routes;
mod utils;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
};
use dash_config::AppConfig;
use dash_control::{
    BulkCommandDispatcher, BulkDispatchConfig, DeviceControlInvoker, MqttInvoker,
    MqttInvokerConfig, NoopInvoker,
};
use dash_message::Locale;
use dash_notification::{NotificationLogStore, ToastConfig, ToastPresenter};
use dash_telemetry::{init_tracing, new_request_ids};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<BulkCommandDispatcher>,
    pub store: Arc<NotificationLogStore>,
    pub toast: Arc<ToastPresenter>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let default_locale = match Locale::parse(&config.default_locale) {
        Some(locale) => locale,
        None => {
            warn!(
                target: "dash.api",
                locale = %config.default_locale,
                "default_locale_unsupported"
            );
            Locale::default()
        }
    };

    // 会话级通知日志与 Toast
    let store = Arc::new(NotificationLogStore::new(config.log_capacity));
    let toast = Arc::new(ToastPresenter::attach(
        store.clone(),
        ToastConfig {
            warn_auto_hide: Duration::from_millis(config.toast_auto_hide_ms),
        },
    )?);

    // 控制链路：未启用时使用空调用器
    let invoker: Arc<dyn DeviceControlInvoker> = if config.control_enabled {
        let (invoker, _eventloop) = MqttInvoker::connect(MqttInvokerConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            command_topic_prefix: config.mqtt_command_topic_prefix.clone(),
            qos: config.mqtt_command_qos,
        })?;
        Arc::new(invoker)
    } else {
        Arc::new(NoopInvoker)
    };
    let dispatcher = Arc::new(BulkCommandDispatcher::new(
        invoker,
        store.clone(),
        BulkDispatchConfig {
            component: config.bulk_component.clone(),
            default_locale,
        },
    ));

    let state = AppState {
        dispatcher,
        store,
        toast,
    };
    let app = build_app(state);

    info!(
        target: "dash.api",
        http_addr = %config.http_addr,
        control_enabled = config.control_enabled,
        log_capacity = config.log_capacity,
        "http_server_starting"
    );
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(state: AppState) -> Router {
    routes::create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    // 生成 request_id 与 trace_id，并注入请求扩展与日志
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::{Method, StatusCode};
    use bytes::Bytes;
    use dash_control::ControlError;
    use domain::{CommandValue, Target};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// `offline-` 前缀的目标调用失败。
    struct OfflinePrefixInvoker;

    #[async_trait]
    impl DeviceControlInvoker for OfflinePrefixInvoker {
        async fn invoke(
            &self,
            target: &Target,
            _command_key: &str,
            _command_value: &CommandValue,
        ) -> Result<(), ControlError> {
            if target.as_str().starts_with("offline-") {
                return Err(ControlError::Invoke("device unreachable".to_string()));
            }
            Ok(())
        }
    }

    fn test_state() -> AppState {
        let store = Arc::new(NotificationLogStore::new(10));
        let toast = Arc::new(
            ToastPresenter::attach(store.clone(), ToastConfig::default()).expect("toast"),
        );
        let dispatcher = Arc::new(BulkCommandDispatcher::new(
            Arc::new(OfflinePrefixInvoker),
            store.clone(),
            BulkDispatchConfig::default(),
        ));
        AppState {
            dispatcher,
            store,
            toast,
        }
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response")
    }

    async fn body_json(response: Response) -> Value {
        let bytes: Bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json")
    }

    fn bulk_power_on(targets: &[&str]) -> Value {
        json!({
            "targets": targets,
            "commandKey": "power",
            "commandValue": true,
            "label": "Power"
        })
    }

    #[tokio::test]
    async fn health_carries_request_ids() {
        let app = build_app(test_state());
        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("x-trace-id"));
        assert_eq!(body_json(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn partial_failure_shows_up_in_notifications_and_toast() {
        let app = build_app(test_state());

        let response = send(
            &app,
            Method::POST,
            "/api/bulk-commands",
            Some(bulk_power_on(&["a", "offline-b", "c"])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(
            body["data"]["tally"],
            json!({ "total": 3, "successCount": 2, "failureCount": 1 })
        );
        assert_eq!(body["data"]["classification"], json!("PARTIAL_FAILURE"));
        assert_eq!(body["data"]["coalesced"], json!(false));
        let entry_id = body["data"]["logEntryId"].as_str().expect("entry id").to_string();

        let body = body_json(send(&app, Method::GET, "/api/notifications", None).await).await;
        assert_eq!(body["data"]["unreadCount"], json!(1));
        assert_eq!(body["data"]["entries"][0]["id"], json!(entry_id));
        assert_eq!(body["data"]["entries"][0]["severity"], json!("WARN"));
        assert_eq!(
            body["data"]["entries"][0]["attributes"]["component"],
            json!("BulkCommand")
        );

        let body =
            body_json(send(&app, Method::GET, "/api/notifications/toast", None).await).await;
        assert_eq!(body["data"]["entry"]["id"], json!(entry_id));

        let body = body_json(
            send(&app, Method::POST, "/api/notifications/toast/dismiss", None).await,
        )
        .await;
        assert_eq!(body["data"]["dismissed"], json!(true));
        let body =
            body_json(send(&app, Method::GET, "/api/notifications/toast", None).await).await;
        assert_eq!(body["data"]["entry"], Value::Null);

        let body = body_json(send(&app, Method::GET, "/api/notifications", None).await).await;
        assert_eq!(body["data"]["unreadCount"], json!(1));
    }

    #[tokio::test]
    async fn full_success_writes_no_notification() {
        let app = build_app(test_state());
        let response = send(
            &app,
            Method::POST,
            "/api/bulk-commands",
            Some(bulk_power_on(&["a", "b"])),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["data"]["classification"], json!("FULL_SUCCESS"));
        assert_eq!(body["data"]["logEntryId"], Value::Null);

        let body = body_json(send(&app, Method::GET, "/api/notifications", None).await).await;
        assert_eq!(body["data"]["entries"], json!([]));
    }

    #[tokio::test]
    async fn invalid_bulk_command_is_rejected() {
        let app = build_app(test_state());
        let response = send(
            &app,
            Method::POST,
            "/api/bulk-commands",
            Some(json!({ "targets": ["a"], "commandKey": "  ", "commandValue": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], json!("INVALID.REQUEST"));

        let response = send(
            &app,
            Method::POST,
            "/api/bulk-commands",
            Some(json!({ "targets": ["a"], "commandKey": "power" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn read_state_endpoints_update_unread_count() {
        let state = test_state();
        let app = build_app(state.clone());
        for _ in 0..2 {
            send(
                &app,
                Method::POST,
                "/api/bulk-commands",
                Some(bulk_power_on(&["offline-a"])),
            )
            .await;
        }
        let first_id = state.store.entries()[0].id.clone();

        let response = send(
            &app,
            Method::POST,
            &format!("/api/notifications/{first_id}/read"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["unreadCount"], json!(1));

        let response = send(&app, Method::POST, "/api/notifications/missing/read", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body =
            body_json(send(&app, Method::POST, "/api/notifications/read-all", None).await).await;
        assert_eq!(body["data"]["unreadCount"], json!(0));
        assert_eq!(body["data"]["entries"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn clear_by_component_keeps_other_entries() {
        let state = test_state();
        let app = build_app(state.clone());
        send(
            &app,
            Method::POST,
            "/api/bulk-commands",
            Some(bulk_power_on(&["offline-a", "b"])),
        )
        .await;
        let response = send(
            &app,
            Method::POST,
            "/api/notifications/ingest",
            Some(json!({
                "type": "log_notification",
                "payload": {
                    "level": "ERROR",
                    "message": "device discovery failed",
                    "time": "2024-05-01T10:00:00Z",
                    "attributes": {}
                }
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.store.len(), 2);

        let response = send(
            &app,
            Method::DELETE,
            "/api/notifications?key=component&value=BulkCommand",
            None,
        )
        .await;
        assert_eq!(body_json(response).await["data"]["removed"], json!(1));
        let remaining = state.store.entries();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].component(), Some("Server"));

        let response = send(&app, Method::DELETE, "/api/notifications?value=Server", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, Method::DELETE, "/api/notifications", None).await;
        assert_eq!(body_json(response).await["data"]["removed"], json!(1));
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn ingest_ignores_info_and_rejects_unknown_types() {
        let state = test_state();
        let app = build_app(state.clone());

        let response = send(
            &app,
            Method::POST,
            "/api/notifications/ingest",
            Some(json!({
                "type": "log_notification",
                "payload": { "level": "INFO", "message": "started" }
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["entryId"], Value::Null);

        let response = send(
            &app,
            Method::POST,
            "/api/notifications/ingest",
            Some(json!({ "type": "device_added", "payload": { "level": "WARN", "message": "x" } })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["code"],
            json!("UNSUPPORTED.MESSAGE")
        );
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn metrics_snapshot_is_served() {
        let app = build_app(test_state());
        send(
            &app,
            Method::POST,
            "/api/bulk-commands",
            Some(bulk_power_on(&["a"])),
        )
        .await;
        let response = send(&app, Method::GET, "/api/metrics", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["data"]["batchesDispatched"].as_u64().unwrap_or_default() >= 1);
    }
}
