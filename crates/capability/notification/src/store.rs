//! 通知日志内存存储
//!
//! - 最新在前，长度不超过 `capacity`
//! - 仅 `is_read` 可变
//! - 每次变更调用结束时同步发布一次快照，按调用顺序

use dash_telemetry::{record_log_entries_evicted, record_log_entry_inserted};
use domain::LogEntry;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

pub use domain::DEFAULT_LOG_CAPACITY;

/// 订阅句柄。
pub type SubscriptionId = u64;

type Observer = Arc<dyn Fn(&LogSnapshot) + Send + Sync>;

/// 触发本次通知的变更。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogChange {
    Inserted { id: String, evicted: usize },
    MarkedRead { id: String },
    MarkedAllRead,
    Cleared,
    ClearedByAttribute { key: String, removed: usize },
}

/// 变更后的存储快照。
#[derive(Debug, Clone)]
pub struct LogSnapshot {
    pub entries: Vec<LogEntry>,
    pub unread_count: usize,
    pub change: LogChange,
}

struct Observers {
    next_id: SubscriptionId,
    items: Vec<(SubscriptionId, Observer)>,
}

/// 有界通知日志存储（会话级）。
pub struct NotificationLogStore {
    capacity: usize,
    entries: RwLock<VecDeque<LogEntry>>,
    observers: RwLock<Observers>,
    // 串行化“变更 + 发布”，保证通知顺序与调用顺序一致。
    publish: Mutex<()>,
    // 正在执行观察者回调的线程。
    publishing_on: Mutex<Option<ThreadId>>,
}

impl NotificationLogStore {
    /// 创建存储；容量至少为 1。
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity + 1)),
            observers: RwLock::new(Observers {
                next_id: 1,
                items: Vec::new(),
            }),
            publish: Mutex::new(()),
            publishing_on: Mutex::new(None),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 头部插入；超出容量时从尾部淘汰最旧条目并返回被淘汰的条目。
    pub fn insert(&self, entry: LogEntry) -> Vec<LogEntry> {
        let capacity = self.capacity;
        self.mutate(move |entries| {
            let id = entry.id.clone();
            entries.push_front(entry);
            let mut evicted = Vec::new();
            while entries.len() > capacity {
                if let Some(oldest) = entries.pop_back() {
                    evicted.push(oldest);
                }
            }
            record_log_entry_inserted();
            if !evicted.is_empty() {
                record_log_entries_evicted(evicted.len() as u64);
                debug!(
                    target: "dash.notification",
                    capacity = capacity,
                    evicted = evicted.len(),
                    "log_entries_evicted"
                );
            }
            let change = LogChange::Inserted {
                id,
                evicted: evicted.len(),
            };
            (evicted, change)
        })
    }

    /// 标记单条已读；条目不存在时不做修改（仍会通知）。
    pub fn mark_read(&self, id: &str) -> bool {
        self.mutate(|entries| {
            let found = match entries.iter_mut().find(|entry| entry.id == id) {
                Some(entry) => {
                    entry.is_read = true;
                    true
                }
                None => false,
            };
            (found, LogChange::MarkedRead { id: id.to_string() })
        })
    }

    pub fn mark_all_read(&self) {
        self.mutate(|entries| {
            for entry in entries.iter_mut() {
                entry.is_read = true;
            }
            ((), LogChange::MarkedAllRead)
        })
    }

    /// 清空历史（重连或操作员显式操作时调用）。
    pub fn clear_all(&self) -> usize {
        self.mutate(|entries| {
            let removed = entries.len();
            entries.clear();
            (removed, LogChange::Cleared)
        })
    }

    /// 删除 `attributes[key]` 满足谓词的条目，返回删除数量。
    pub fn clear_by_attribute<F>(&self, key: &str, predicate: F) -> usize
    where
        F: Fn(&serde_json::Value) -> bool,
    {
        self.mutate(|entries| {
            let before = entries.len();
            entries.retain(|entry| !entry.attribute(key).is_some_and(&predicate));
            let removed = before - entries.len();
            let change = LogChange::ClearedByAttribute {
                key: key.to_string(),
                removed,
            };
            (removed, change)
        })
    }

    /// 删除 `attributes[key]` 等于给定字符串的条目。
    pub fn clear_by_attribute_eq(&self, key: &str, value: &str) -> usize {
        self.clear_by_attribute(key, |attribute| attribute.as_str() == Some(value))
    }

    pub fn unread_count(&self) -> usize {
        count_unread(&read_lock(&self.entries))
    }

    /// 全部条目（最新在前）。
    pub fn entries(&self) -> Vec<LogEntry> {
        read_lock(&self.entries).iter().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<LogEntry> {
        read_lock(&self.entries)
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        read_lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        read_lock(&self.entries).is_empty()
    }

    /// 注册观察者。
    ///
    /// 回调在变更线程上同步执行；回调内可以查询存储。
    /// 回调内发起的修改会被忽略并记录 warn 日志。
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&LogSnapshot) + Send + Sync + 'static,
    {
        let mut observers = write_lock(&self.observers);
        let id = observers.next_id;
        observers.next_id += 1;
        observers.items.push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = write_lock(&self.observers);
        let before = observers.items.len();
        observers.items.retain(|(item_id, _)| *item_id != id);
        observers.items.len() != before
    }

    pub fn observer_count(&self) -> usize {
        read_lock(&self.observers).items.len()
    }

    fn mutate<R: Default>(
        &self,
        apply: impl FnOnce(&mut VecDeque<LogEntry>) -> (R, LogChange),
    ) -> R {
        let current = thread::current().id();
        if *lock(&self.publishing_on) == Some(current) {
            warn!(target: "dash.notification", "log_store_reentrant_mutation_skipped");
            return R::default();
        }
        let _publish = lock(&self.publish);
        let (result, snapshot) = {
            let mut entries = write_lock(&self.entries);
            let (result, change) = apply(&mut entries);
            let snapshot = LogSnapshot {
                entries: entries.iter().cloned().collect(),
                unread_count: count_unread(&entries),
                change,
            };
            (result, snapshot)
        };
        let observers: Vec<Observer> = read_lock(&self.observers)
            .items
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        let _publishing = PublishingMark::set(&self.publishing_on, current);
        for observer in observers {
            observer(&snapshot);
        }
        result
    }
}

impl Default for NotificationLogStore {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

/// 观察者回调期间标记当前线程，回调结束（含 panic 展开）时清除。
struct PublishingMark<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> PublishingMark<'a> {
    fn set(slot: &'a Mutex<Option<ThreadId>>, thread: ThreadId) -> Self {
        *lock(slot) = Some(thread);
        Self { slot }
    }
}

impl Drop for PublishingMark<'_> {
    fn drop(&mut self) {
        *lock(self.slot) = None;
    }
}

fn count_unread(entries: &VecDeque<LogEntry>) -> usize {
    entries.iter().filter(|entry| !entry.is_read).count()
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
