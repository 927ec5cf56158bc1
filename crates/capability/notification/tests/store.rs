use dash_notification::{LogChange, LogSnapshot, NotificationLogStore};
use domain::{LogEntry, Severity};
use std::sync::{Arc, Mutex, Weak};

fn entry(message: &str) -> LogEntry {
    LogEntry::new(Severity::Warn, message)
}

fn recorder(store: &NotificationLogStore) -> Arc<Mutex<Vec<LogSnapshot>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store.subscribe(move |snapshot| sink.lock().expect("lock").push(snapshot.clone()));
    seen
}

fn messages(store: &NotificationLogStore) -> Vec<String> {
    store.entries().into_iter().map(|entry| entry.message).collect()
}

#[test]
fn capacity_two_evicts_oldest() {
    let store = NotificationLogStore::new(2);
    store.insert(entry("A"));
    store.insert(entry("B"));
    let evicted = store.insert(entry("C"));
    assert_eq!(messages(&store), vec!["C", "B"]);
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].message, "A");
}

#[test]
fn overflow_keeps_most_recent_in_order() {
    let capacity = 5;
    let store = NotificationLogStore::new(capacity);
    for index in 0..capacity + 3 {
        store.insert(entry(&format!("e{index}")));
    }
    assert_eq!(store.len(), capacity);
    assert_eq!(messages(&store), vec!["e7", "e6", "e5", "e4", "e3"]);
}

#[test]
fn zero_capacity_is_raised_to_one() {
    let store = NotificationLogStore::new(0);
    assert_eq!(store.capacity(), 1);
    store.insert(entry("A"));
    store.insert(entry("B"));
    assert_eq!(messages(&store), vec!["B"]);
}

#[test]
fn mark_all_read_then_insert_counts_one_unread() {
    let store = NotificationLogStore::default();
    store.insert(entry("A"));
    store.insert(entry("B"));
    assert_eq!(store.unread_count(), 2);
    store.mark_all_read();
    assert_eq!(store.unread_count(), 0);
    store.insert(entry("C"));
    assert_eq!(store.unread_count(), 1);
}

#[test]
fn mark_read_only_touches_matching_entry() {
    let store = NotificationLogStore::default();
    let first = entry("A");
    let first_id = first.id.clone();
    store.insert(first);
    store.insert(entry("B"));

    assert!(store.mark_read(&first_id));
    assert!(store.get(&first_id).expect("entry").is_read);
    assert_eq!(store.unread_count(), 1);

    assert!(!store.mark_read("missing"));
    assert_eq!(store.unread_count(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn clear_by_attribute_removes_only_tagged_entries_with_one_notification() {
    let store = NotificationLogStore::default();
    store.insert(entry("power-1").with_attribute("component", "BulkPower"));
    store.insert(entry("server").with_attribute("component", "Server"));
    store.insert(entry("untagged"));
    store.insert(entry("power-2").with_attribute("component", "BulkPower"));
    let seen = recorder(&store);

    let removed = store.clear_by_attribute_eq("component", "BulkPower");

    assert_eq!(removed, 2);
    assert_eq!(messages(&store), vec!["untagged", "server"]);
    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].change,
        LogChange::ClearedByAttribute {
            key: "component".to_string(),
            removed: 2,
        }
    );
    assert_eq!(seen[0].entries.len(), 2);
}

#[test]
fn clear_by_attribute_accepts_custom_predicate() {
    let store = NotificationLogStore::default();
    store.insert(entry("a").with_attribute("failureCount", 1));
    store.insert(entry("b").with_attribute("failureCount", 4));
    let removed = store.clear_by_attribute("failureCount", |value| {
        value.as_u64().is_some_and(|count| count > 2)
    });
    assert_eq!(removed, 1);
    assert_eq!(messages(&store), vec!["a"]);
}

#[test]
fn every_mutation_publishes_in_order() {
    let store = NotificationLogStore::new(3);
    let seen = recorder(&store);

    let first = entry("A");
    let first_id = first.id.clone();
    store.insert(first);
    store.mark_read(&first_id);
    store.mark_read("missing");
    store.mark_all_read();
    store.clear_all();

    let seen = seen.lock().expect("lock");
    let changes: Vec<LogChange> = seen.iter().map(|snapshot| snapshot.change.clone()).collect();
    assert_eq!(
        changes,
        vec![
            LogChange::Inserted {
                id: first_id.clone(),
                evicted: 0,
            },
            LogChange::MarkedRead {
                id: first_id.clone(),
            },
            LogChange::MarkedRead {
                id: "missing".to_string(),
            },
            LogChange::MarkedAllRead,
            LogChange::Cleared,
        ]
    );
    assert_eq!(seen[0].unread_count, 1);
    assert_eq!(seen[1].unread_count, 0);
    assert!(seen[4].entries.is_empty());
}

#[test]
fn unsubscribe_stops_notifications() {
    let store = NotificationLogStore::default();
    let seen = Arc::new(Mutex::new(0usize));
    let sink = seen.clone();
    let id = store.subscribe(move |_| *sink.lock().expect("lock") += 1);
    store.insert(entry("A"));
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.insert(entry("B"));
    assert_eq!(*seen.lock().expect("lock"), 1);
    assert_eq!(store.observer_count(), 0);
}

#[test]
fn observer_may_query_store_during_callback() {
    let store = Arc::new(NotificationLogStore::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let reader = Arc::downgrade(&store);
    store.subscribe(move |snapshot| {
        if let Some(store) = reader.upgrade() {
            sink.lock()
                .expect("lock")
                .push((snapshot.unread_count, store.unread_count()));
        }
    });
    store.insert(entry("A"));
    store.insert(entry("B"));
    assert_eq!(*seen.lock().expect("lock"), vec![(1, 1), (2, 2)]);
}

#[test]
fn default_capacity_matches_shared_constant() {
    let store = NotificationLogStore::default();
    assert_eq!(store.capacity(), domain::DEFAULT_LOG_CAPACITY);
    assert_eq!(dash_notification::DEFAULT_LOG_CAPACITY, domain::DEFAULT_LOG_CAPACITY);
}

#[test]
fn observer_mutation_is_skipped_instead_of_deadlocking() {
    let store = Arc::new(NotificationLogStore::default());
    let weak: Weak<NotificationLogStore> = Arc::downgrade(&store);
    let removed_in_callback = Arc::new(Mutex::new(Vec::new()));
    let sink = removed_in_callback.clone();
    store.subscribe(move |_snapshot| {
        if let Some(store) = weak.upgrade() {
            sink.lock().expect("lock").push(store.clear_all());
        }
    });
    let seen = recorder(&store);

    store.insert(entry("A"));
    store.insert(entry("B"));

    assert_eq!(messages(&store), vec!["B", "A"]);
    assert_eq!(*removed_in_callback.lock().expect("lock"), vec![0, 0]);
    assert_eq!(seen.lock().expect("lock").len(), 2);

    // 回调结束后，正常修改不受影响。
    assert_eq!(store.clear_all(), 2);
    assert!(store.is_empty());
}
