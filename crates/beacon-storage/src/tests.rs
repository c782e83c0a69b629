use crate::store::JsonFileStore;
use crate::{NotificationStore, StorageError};
use beacon_common::types::{NotificationInput, NotificationKind, NotificationPatch, NotificationRecord};
use chrono::{TimeZone, Utc};
use std::collections::HashSet;
use tempfile::TempDir;

fn setup() -> (TempDir, JsonFileStore) {
    beacon_common::id::init(1, 1);
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(&dir.path().join("db.json")).unwrap();
    (dir, store)
}

fn input(title: &str) -> NotificationInput {
    NotificationInput {
        title: Some(title.to_string()),
        ..NotificationInput::default()
    }
}

fn seed_record(id: &str, kind: NotificationKind) -> NotificationRecord {
    NotificationRecord {
        id: id.to_string(),
        title: format!("seed {id}"),
        body: "seeded".to_string(),
        kind,
        notified: false,
        time: None,
        timestamp: Utc.with_ymd_and_hms(2025, 1, 11, 10, 0, 0).unwrap(),
    }
}

#[test]
fn open_creates_fresh_document() {
    let (dir, store) = setup();
    assert!(store.is_fresh());
    assert!(store.list().unwrap().is_empty());

    let content = std::fs::read_to_string(dir.path().join("db.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(doc["notifications"], serde_json::json!([]));
}

#[test]
fn create_assigns_unique_ids_and_timestamps() {
    let (_dir, store) = setup();
    let mut ids = HashSet::new();
    let mut last_ts = None;
    for i in 0..20 {
        let record = store.create(input(&format!("n{i}"))).unwrap();
        let after = Utc::now();
        assert!(!record.id.is_empty());
        assert!(ids.insert(record.id.clone()));
        assert!(record.timestamp <= after);
        if let Some(prev) = last_ts {
            assert!(record.timestamp >= prev);
        }
        last_ts = Some(record.timestamp);
        assert!(record.notified);
    }
}

#[test]
fn latest_follows_insertion_order() {
    let (_dir, store) = setup();
    let mut last = None;
    for i in 0..5 {
        last = Some(store.create(input(&format!("n{i}"))).unwrap());
    }
    assert_eq!(store.latest().unwrap(), last.unwrap());
}

#[test]
fn latest_on_empty_store_is_not_found() {
    let store = JsonFileStore::in_memory();
    let err = store.latest().unwrap_err();
    assert!(matches!(err, StorageError::Empty { .. }));
    assert!(err.is_not_found());
}

#[test]
fn update_changes_only_given_field() {
    let (_dir, store) = setup();
    let created = store.create(input("before")).unwrap();

    let patch = NotificationPatch {
        title: Some("after".to_string()),
        ..NotificationPatch::default()
    };
    let updated = store.update(&created.id, &patch).unwrap();
    assert_eq!(updated.title, "after");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.timestamp, created.timestamp);
    assert_eq!(updated.body, created.body);
    assert_eq!(updated.kind, created.kind);
    assert_eq!(updated.notified, created.notified);
    assert_eq!(updated.time, created.time);
    assert_eq!(store.find(&created.id).unwrap(), updated);
}

#[test]
fn update_may_change_type_and_time() {
    let (_dir, store) = setup();
    let created = store.create(input("x")).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 1, 11, 20, 0, 0).unwrap();
    let patch = NotificationPatch {
        kind: Some(NotificationKind::Scheduled),
        time: Some(Some(at)),
        ..NotificationPatch::default()
    };
    let updated = store.update(&created.id, &patch).unwrap();
    assert_eq!(updated.kind, NotificationKind::Scheduled);
    assert_eq!(updated.time, Some(at));

    let cleared = store
        .update(
            &created.id,
            &NotificationPatch {
                time: Some(None),
                ..NotificationPatch::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.time, None);
}

#[test]
fn update_unknown_id_leaves_collection_unchanged() {
    let (_dir, store) = setup();
    store.create(input("a")).unwrap();
    let before = store.list().unwrap();

    let err = store
        .update("999", &NotificationPatch::mark_read())
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
    assert_eq!(store.list().unwrap(), before);
}

#[test]
fn mark_read_sets_notified() {
    let (_dir, store) = setup();
    store.import(vec![seed_record("1", NotificationKind::Local)]).unwrap();
    let record = store.mark_read("1").unwrap();
    assert!(record.notified);
    assert!(store.mark_read("999").unwrap_err().is_not_found());
}

#[test]
fn mark_all_read_and_unread_count() {
    let (_dir, store) = setup();
    store
        .import(vec![
            seed_record("1", NotificationKind::Local),
            seed_record("2", NotificationKind::Scheduled),
        ])
        .unwrap();
    store.create(input("sent")).unwrap();
    assert_eq!(store.unread_count().unwrap(), 2);

    assert_eq!(store.mark_all_read().unwrap(), 2);
    assert_eq!(store.unread_count().unwrap(), 0);
    assert_eq!(store.mark_all_read().unwrap(), 0);
}

#[test]
fn delete_removes_exactly_one_record() {
    let (_dir, store) = setup();
    let a = store.create(input("a")).unwrap();
    let b = store.create(input("b")).unwrap();

    store.delete(&a.id).unwrap();
    let remaining = store.list().unwrap();
    assert_eq!(remaining, vec![b]);

    let err = store.delete(&a.id).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn clear_returns_previous_size() {
    let (_dir, store) = setup();
    for i in 0..3 {
        store.create(input(&format!("n{i}"))).unwrap();
    }
    assert_eq!(store.clear().unwrap(), 3);
    assert!(store.list().unwrap().is_empty());
    assert_eq!(store.clear().unwrap(), 0);
}

#[test]
fn stats_match_snapshot() {
    let (_dir, store) = setup();
    store
        .import(vec![
            seed_record("1", NotificationKind::Local),
            seed_record("2", NotificationKind::Scheduled),
        ])
        .unwrap();
    store.create(input("sent")).unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.notified, 1);
    assert_eq!(stats.unnotified, 2);
    assert_eq!(stats.by_type.local, 2);
    assert_eq!(stats.by_type.scheduled, 1);
}

#[test]
fn import_skips_existing_ids() {
    let (_dir, store) = setup();
    let added = store
        .import(vec![
            seed_record("1", NotificationKind::Local),
            seed_record("1", NotificationKind::Scheduled),
        ])
        .unwrap();
    assert_eq!(added, 1);
    assert_eq!(
        store
            .import(vec![seed_record("1", NotificationKind::Local)])
            .unwrap(),
        0
    );
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn reopen_restores_snapshot_in_order() {
    let (dir, store) = setup();
    let path = dir.path().join("db.json");
    store.import(vec![seed_record("1", NotificationKind::Local)]).unwrap();
    let sent = store.create(input("sent")).unwrap();
    store.mark_read("1").unwrap();
    let before = store.list().unwrap();
    drop(store);

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.path(), Some(path.as_path()));
    assert!(!reopened.is_fresh());
    assert_eq!(reopened.list().unwrap(), before);
    assert_eq!(reopened.latest().unwrap(), sent);
}

#[test]
fn open_reads_hand_written_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        r#"{
  "notifications": [
    {
      "id": "2",
      "title": "Meeting Reminder",
      "body": "Team sync at 8 PM",
      "type": "scheduled",
      "notified": false,
      "time": "2025-01-11T20:00:00Z",
      "timestamp": "2025-01-11T10:30:00Z"
    }
  ]
}"#,
    )
    .unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    let record = store.find("2").unwrap();
    assert_eq!(record.kind, NotificationKind::Scheduled);
    assert_eq!(
        record.time,
        Some(Utc.with_ymd_and_hms(2025, 1, 11, 20, 0, 0).unwrap())
    );
}

#[test]
fn open_rejects_corrupt_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = JsonFileStore::open(&path).err().unwrap();
    assert!(matches!(err, StorageError::Json(_)));
}

#[test]
fn in_memory_store_writes_nothing() {
    let store = JsonFileStore::in_memory();
    assert!(store.path().is_none());
    store.create(input("a")).unwrap();
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn failed_flush_leaves_collection_unchanged() {
    beacon_common::id::init(1, 1);
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    let store = JsonFileStore::open(&data_dir.join("db.json")).unwrap();
    let kept = store.create(input("kept")).unwrap();

    std::fs::remove_dir_all(&data_dir).unwrap();

    let err = store.create(input("lost")).unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
    assert!(!err.is_not_found());
    assert!(store.update(&kept.id, &NotificationPatch::mark_read()).is_err());
    assert!(store.delete(&kept.id).is_err());
    assert!(!store.clear().unwrap_err().is_not_found());

    assert_eq!(store.list().unwrap(), vec![kept.clone()]);
    assert_eq!(store.latest().unwrap(), kept);
}

#[test]
fn open_reads_document_with_numeric_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        r#"{"notifications":[{"id":1736589600000,"title":"Hi","body":"There","type":"local","notified":true,"time":null,"timestamp":"2025-01-11T10:00:00.000Z"}]}"#,
    )
    .unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    assert_eq!(store.find("1736589600000").unwrap().title, "Hi");
}
