//! Toast 可见性
//!
//! 订阅日志存储，最新插入的条目成为当前 Toast：
//! - WARN：从条目创建时刻起计时，到期自动隐藏
//! - ERROR：不自动隐藏，需 `dismiss`
//!
//! 每个定时器按条目 ID 持有 `JoinHandle`，条目离开历史、被关闭或
//! presenter 被丢弃时中止，避免对已删除条目触发过期回调。

use crate::error::NotificationError;
use crate::store::{LogChange, LogSnapshot, NotificationLogStore, SubscriptionId, lock};
use domain::{LogEntry, Severity, now_epoch_ms};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// WARN Toast 默认自动隐藏延迟。
pub const DEFAULT_TOAST_AUTO_HIDE: Duration = Duration::from_millis(5_000);

/// Toast 配置。
#[derive(Debug, Clone, Copy)]
pub struct ToastConfig {
    pub warn_auto_hide: Duration,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            warn_auto_hide: DEFAULT_TOAST_AUTO_HIDE,
        }
    }
}

struct ToastState {
    visible: Option<LogEntry>,
    timers: HashMap<String, JoinHandle<()>>,
}

struct ToastInner {
    config: ToastConfig,
    runtime: Handle,
    state: Mutex<ToastState>,
}

impl ToastInner {
    fn on_change(inner: &Arc<Self>, snapshot: &LogSnapshot) {
        let mut state = lock(&inner.state);

        state.timers.retain(|id, handle| {
            let present = snapshot.entries.iter().any(|entry| &entry.id == id);
            if !present {
                handle.abort();
            }
            present
        });
        if let Some(visible_id) = state.visible.as_ref().map(|entry| entry.id.clone()) {
            state.visible = snapshot
                .entries
                .iter()
                .find(|entry| entry.id == visible_id)
                .cloned();
        }

        let LogChange::Inserted { id, .. } = &snapshot.change else {
            return;
        };
        let Some(entry) = snapshot.entries.iter().find(|entry| &entry.id == id) else {
            return;
        };
        if let Some(previous) = state.visible.take() {
            if let Some(handle) = state.timers.remove(&previous.id) {
                handle.abort();
            }
        }
        if entry.severity == Severity::Warn {
            let delay = remaining_delay(entry.created_at_ms, inner.config.warn_auto_hide);
            let handle = Self::spawn_hide_timer(inner, entry.id.clone(), delay);
            state.timers.insert(entry.id.clone(), handle);
        }
        debug!(
            target: "dash.notification",
            entry_id = %entry.id,
            severity = %entry.severity,
            "toast_shown"
        );
        state.visible = Some(entry.clone());
    }

    fn spawn_hide_timer(inner: &Arc<Self>, id: String, delay: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(inner);
        inner.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(&id);
            }
        })
    }

    fn expire(&self, id: &str) {
        let mut state = lock(&self.state);
        state.timers.remove(id);
        if state.visible.as_ref().is_some_and(|entry| entry.id == id) {
            state.visible = None;
            debug!(target: "dash.notification", entry_id = %id, "toast_auto_hidden");
        }
    }
}

/// 展示层使用的 Toast 状态机。
pub struct ToastPresenter {
    store: Arc<NotificationLogStore>,
    subscription: SubscriptionId,
    inner: Arc<ToastInner>,
}

impl ToastPresenter {
    /// 订阅存储；需要在 tokio 运行时内调用。
    pub fn attach(
        store: Arc<NotificationLogStore>,
        config: ToastConfig,
    ) -> Result<Self, NotificationError> {
        let runtime = Handle::try_current().map_err(|_| NotificationError::NoRuntime)?;
        let inner = Arc::new(ToastInner {
            config,
            runtime,
            state: Mutex::new(ToastState {
                visible: None,
                timers: HashMap::new(),
            }),
        });
        let weak = Arc::downgrade(&inner);
        let subscription = store.subscribe(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                ToastInner::on_change(&inner, snapshot);
            }
        });
        Ok(Self {
            store,
            subscription,
            inner,
        })
    }

    pub fn config(&self) -> ToastConfig {
        self.inner.config
    }

    /// 当前展示的 Toast。
    pub fn visible(&self) -> Option<LogEntry> {
        lock(&self.inner.state).visible.clone()
    }

    /// 关闭当前 Toast；历史与已读状态不变。
    pub fn dismiss(&self) -> bool {
        let mut state = lock(&self.inner.state);
        let Some(entry) = state.visible.take() else {
            return false;
        };
        if let Some(handle) = state.timers.remove(&entry.id) {
            handle.abort();
        }
        debug!(target: "dash.notification", entry_id = %entry.id, "toast_dismissed");
        true
    }

    /// 尚未触发的自动隐藏定时器数量。
    pub fn pending_timers(&self) -> usize {
        lock(&self.inner.state).timers.len()
    }
}

impl Drop for ToastPresenter {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
        let mut state = lock(&self.inner.state);
        for (_, handle) in state.timers.drain() {
            handle.abort();
        }
        state.visible = None;
    }
}

fn remaining_delay(created_at_ms: i64, auto_hide: Duration) -> Duration {
    let age_ms = now_epoch_ms().saturating_sub(created_at_ms).max(0) as u64;
    auto_hide.saturating_sub(Duration::from_millis(age_ms))
}
