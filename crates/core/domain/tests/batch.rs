use domain::{BatchClassification, BatchRequest, BatchTally, LogEntry, Severity, Target};

#[test]
fn tally_classification_boundaries() {
    let empty = BatchTally::default();
    assert_eq!(empty.classification(), BatchClassification::FullSuccess);

    let full = BatchTally {
        total: 3,
        success_count: 3,
        failure_count: 0,
    };
    assert_eq!(full.classification(), BatchClassification::FullSuccess);

    let total = BatchTally {
        total: 4,
        success_count: 0,
        failure_count: 4,
    };
    assert_eq!(total.classification(), BatchClassification::TotalFailure);

    let partial = BatchTally {
        total: 5,
        success_count: 3,
        failure_count: 2,
    };
    assert_eq!(partial.classification(), BatchClassification::PartialFailure);

    let single_failure = BatchTally {
        total: 1,
        success_count: 0,
        failure_count: 1,
    };
    assert_eq!(single_failure.classification(), BatchClassification::TotalFailure);
}

#[test]
fn request_label_falls_back_to_command_key() {
    let request = BatchRequest::new(
        vec![Target::new("192.168.0.3 0x0130:1")],
        "operation_status",
        serde_json::json!("on"),
    );
    assert_eq!(request.display_label(), "operation_status");

    let request = request.with_label("  ");
    assert_eq!(request.display_label(), "operation_status");

    let request = request.with_label("Power");
    assert_eq!(request.display_label(), "Power");
}

#[test]
fn severity_parses_log_levels() {
    assert_eq!(Severity::parse_level("ERROR"), Some(Severity::Error));
    assert_eq!(Severity::parse_level("warn"), Some(Severity::Warn));
    assert_eq!(Severity::parse_level("WARNING"), Some(Severity::Warn));
    assert_eq!(Severity::parse_level("INFO"), None);
}

#[test]
fn log_entry_starts_unread_with_unique_id() {
    let first = LogEntry::new(Severity::Warn, "a").with_attribute("component", "BulkPower");
    let second = LogEntry::new(Severity::Warn, "a");
    assert!(!first.is_read);
    assert_ne!(first.id, second.id);
    assert_eq!(first.component(), Some("BulkPower"));
    assert_eq!(second.component(), None);
}
