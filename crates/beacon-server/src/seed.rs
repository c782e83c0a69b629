use beacon_common::types::{NotificationKind, NotificationRecord};
use beacon_storage::NotificationStore;
use chrono::{TimeZone, Utc};

use crate::config::SeedFile;

/// Records imported the first time the document is created.
pub fn default_notifications() -> Vec<NotificationRecord> {
    vec![
        NotificationRecord {
            id: "1".to_string(),
            title: "Welcome".to_string(),
            body: "Welcome to the notification app!".to_string(),
            kind: NotificationKind::Local,
            notified: false,
            time: None,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 11, 10, 0, 0).single().unwrap_or_default(),
        },
        NotificationRecord {
            id: "2".to_string(),
            title: "Meeting Reminder".to_string(),
            body: "Team sync at 8 PM".to_string(),
            kind: NotificationKind::Scheduled,
            notified: false,
            time: Utc.with_ymd_and_hms(2025, 1, 11, 20, 0, 0).single(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 11, 10, 30, 0).single().unwrap_or_default(),
        },
    ]
}

/// Import the default records, but only into a freshly created document.
pub fn init_default_notifications(store: &dyn NotificationStore) -> anyhow::Result<usize> {
    if !store.is_fresh() {
        tracing::debug!("Notification document already existed, skipping default seed");
        return Ok(0);
    }
    let inserted = store.import(default_notifications())?;
    tracing::info!(inserted, "Seeded default notifications");
    Ok(inserted)
}

/// Import records from a JSON seed file shaped like the store document.
pub fn init_from_seed_file(store: &dyn NotificationStore, seed_path: &str) -> anyhow::Result<usize> {
    let content = std::fs::read_to_string(seed_path)
        .map_err(|e| anyhow::anyhow!("Failed to read seed file '{}': {}", seed_path, e))?;
    let seed: SeedFile = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse seed file '{}': {}", seed_path, e))?;

    let total = seed.notifications.len();
    let inserted = store.import(seed.notifications)?;
    tracing::info!(
        inserted,
        skipped = total - inserted,
        "init-seed completed"
    );
    Ok(inserted)
}
