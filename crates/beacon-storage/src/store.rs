use beacon_common::types::{
    NotificationInput, NotificationKind, NotificationPatch, NotificationRecord, NotificationStats,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

use crate::error::{Result, StorageError};
use crate::{stats, NotificationStore};

const ENTITY: &str = "notification";

#[derive(Deserialize, Default)]
struct Document {
    #[serde(default)]
    notifications: Vec<NotificationRecord>,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    notifications: &'a [NotificationRecord],
}

/// Record store backed by a single JSON document.
///
/// The document is read once at open time. Every mutation works on a copy of
/// the collection, writes that copy to a temp file next to the document and
/// renames it into place, and only then publishes it in memory. A failed
/// write therefore leaves both the file and the in-memory state untouched.
pub struct JsonFileStore {
    path: Option<PathBuf>,
    fresh: bool,
    records: Mutex<Vec<NotificationRecord>>,
}

impl JsonFileStore {
    /// Opens (or creates) the document at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let fresh = !path.exists();
        let records = if fresh {
            Vec::new()
        } else {
            let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<Document>(&content)?.notifications
            }
        };

        let store = Self {
            path: Some(path.to_path_buf()),
            fresh,
            records: Mutex::new(records),
        };
        if fresh {
            store.flush(&[])?;
            tracing::info!(path = %path.display(), "Created notification document");
        } else {
            tracing::info!(
                path = %path.display(),
                count = store.lock().len(),
                "Loaded notification document"
            );
        }
        Ok(store)
    }

    /// A store with no backing file. Mutations are never flushed.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            fresh: true,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NotificationRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flush(&self, records: &[NotificationRecord]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
        serde_json::to_writer_pretty(&mut tmp, &DocumentRef { notifications: records })?;
        tmp.write_all(b"\n").map_err(|e| io_error(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(path).map_err(|e| StorageError::Persist {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), count = records.len(), "Flushed snapshot");
        Ok(())
    }

    /// Runs `op` against a working copy and publishes it once flushed. An
    /// error from `op` discards the copy without touching the document.
    fn mutate<T>(&self, op: impl FnOnce(&mut Vec<NotificationRecord>) -> Result<T>) -> Result<T> {
        let mut records = self.lock();
        let mut next = records.clone();
        let out = op(&mut next)?;
        self.flush(&next)?;
        *records = next;
        Ok(out)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn not_found(id: &str) -> StorageError {
    StorageError::NotFound {
        entity: ENTITY,
        id: id.to_string(),
    }
}

fn unused_id(records: &[NotificationRecord]) -> String {
    loop {
        let id = beacon_common::id::next_id();
        if !records.iter().any(|r| r.id == id) {
            return id;
        }
    }
}

impl NotificationStore for JsonFileStore {
    fn create(&self, input: NotificationInput) -> Result<NotificationRecord> {
        self.mutate(|records| {
            let id = unused_id(records);
            // Keep timestamps non-decreasing in insertion order.
            let now = Utc::now();
            let timestamp = match records.last() {
                Some(last) if last.timestamp > now => last.timestamp,
                _ => now,
            };
            let record = input.into_record(id, timestamp);
            if record.kind == NotificationKind::Scheduled && record.time.is_none() {
                tracing::warn!(id = %record.id, "Scheduled notification stored without a time");
            }
            records.push(record.clone());
            Ok(record)
        })
    }

    fn list(&self) -> Result<Vec<NotificationRecord>> {
        Ok(self.lock().clone())
    }

    fn latest(&self) -> Result<NotificationRecord> {
        self.lock()
            .last()
            .cloned()
            .ok_or(StorageError::Empty { entity: ENTITY })
    }

    fn find(&self, id: &str) -> Result<NotificationRecord> {
        self.lock()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn update(&self, id: &str, patch: &NotificationPatch) -> Result<NotificationRecord> {
        if patch.is_empty() {
            return self.find(id);
        }
        self.mutate(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| not_found(id))?;
            patch.apply(record);
            Ok(record.clone())
        })
    }

    fn mark_all_read(&self) -> Result<usize> {
        self.mutate(|records| {
            let mut changed = 0;
            for record in records.iter_mut().filter(|r| !r.notified) {
                record.notified = true;
                changed += 1;
            }
            Ok(changed)
        })
    }

    fn delete(&self, id: &str) -> Result<()> {
        self.mutate(|records| {
            let pos = records
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| not_found(id))?;
            records.remove(pos);
            Ok(())
        })
    }

    fn clear(&self) -> Result<usize> {
        self.mutate(|records| {
            let count = records.len();
            records.clear();
            Ok(count)
        })
    }

    fn unread_count(&self) -> Result<usize> {
        Ok(self.lock().iter().filter(|r| !r.notified).count())
    }

    fn stats(&self) -> Result<NotificationStats> {
        Ok(stats::compute(&self.lock()))
    }

    fn import(&self, incoming: Vec<NotificationRecord>) -> Result<usize> {
        self.mutate(|records| {
            let mut seen: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
            let mut added = 0;
            for record in incoming {
                if !seen.insert(record.id.clone()) {
                    tracing::warn!(id = %record.id, "Notification id already exists, skipping");
                    continue;
                }
                records.push(record);
                added += 1;
            }
            Ok(added)
        })
    }

    fn is_fresh(&self) -> bool {
        self.fresh
    }
}
