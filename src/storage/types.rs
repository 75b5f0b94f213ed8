use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors opening the database, with user-facing messages.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another instance of the application has locked the database
    #[error("Another instance of dailynews appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    pub(crate) fn is_lock_message(message: &str) -> bool {
        let lower = message.to_lowercase();
        // SQLITE_BUSY, SQLITE_LOCKED, SQLITE_CANTOPEN
        lower.contains("database is locked")
            || lower.contains("database table is locked")
            || lower.contains("sqlite_busy")
            || lower.contains("sqlite_locked")
            || lower.contains("unable to open database file")
    }

    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if Self::is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

/// Errors from the article store and the HTTP cache tables.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// A response stored in one of the offline cache partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub cache_name: String,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}
