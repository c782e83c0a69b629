/// Errors that can occur within the record store.
///
/// # Examples
///
/// ```rust
/// use beacon_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "notification",
///     id: "999".to_string(),
/// };
/// assert!(err.is_not_found());
/// assert!(err.to_string().contains("999"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No record with the given id exists.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// The collection is empty, so there is no latest record.
    #[error("Storage: no {entity} records found")]
    Empty { entity: &'static str },

    /// Reading or writing the backing document failed.
    #[error("Storage: I/O error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The backing document could not be encoded or decoded.
    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Atomically replacing the backing document failed.
    #[error("Storage: failed to replace '{path}': {source}")]
    Persist {
        path: String,
        source: tempfile::PersistError,
    },
}

impl StorageError {
    /// Lookup misses (unknown id or empty collection).
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. } | StorageError::Empty { .. })
    }
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
