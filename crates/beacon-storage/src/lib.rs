//! Notification record store.
//!
//! The default implementation ([`store::JsonFileStore`]) keeps the whole
//! collection in memory and rewrites a single JSON document
//! (`{ "notifications": [...] }`) after every mutation.

pub mod error;
pub mod stats;
pub mod store;

#[cfg(test)]
mod tests;

use beacon_common::types::{
    NotificationInput, NotificationPatch, NotificationRecord, NotificationStats,
};

pub use error::{Result, StorageError};
pub use store::JsonFileStore;

/// Persistence backend for notification records.
///
/// Implementations must be `Send + Sync` because the store is shared by every
/// HTTP handler. Each call is atomic: it either applies completely (including
/// the snapshot flush) or leaves the collection unchanged.
pub trait NotificationStore: Send + Sync {
    /// Stores a new record built from `input`, appended last. The id and
    /// creation timestamp are always server-assigned.
    fn create(&self, input: NotificationInput) -> Result<NotificationRecord>;

    /// Returns every record in insertion order.
    fn list(&self) -> Result<Vec<NotificationRecord>>;

    /// Returns the most recently inserted record.
    fn latest(&self) -> Result<NotificationRecord>;

    /// Looks up a record by id.
    fn find(&self, id: &str) -> Result<NotificationRecord>;

    /// Shallow-merges `patch` into the record with the given id.
    fn update(&self, id: &str, patch: &NotificationPatch) -> Result<NotificationRecord>;

    /// Sets `notified = true` on the record with the given id.
    fn mark_read(&self, id: &str) -> Result<NotificationRecord> {
        self.update(id, &NotificationPatch::mark_read())
    }

    /// Sets `notified = true` on every record. Returns how many changed.
    fn mark_all_read(&self) -> Result<usize>;

    /// Removes the record with the given id.
    fn delete(&self, id: &str) -> Result<()>;

    /// Removes every record. Returns the number removed.
    fn clear(&self) -> Result<usize>;

    /// Number of records not yet displayed by the client.
    fn unread_count(&self) -> Result<usize>;

    /// Status/type summary of the current snapshot.
    fn stats(&self) -> Result<NotificationStats> {
        Ok(stats::compute(&self.list()?))
    }

    /// Appends complete records verbatim (used for seeding), skipping ids that
    /// already exist. Returns the number added.
    fn import(&self, records: Vec<NotificationRecord>) -> Result<usize>;

    /// True when the backing document did not exist before this store opened it.
    fn is_fresh(&self) -> bool;
}
