//! # Storage Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error) / corrupt JSON / rejected write            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds key and categorization                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ShellError (in app) ← Serialized for the UI layer                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither read nor write failures are retried anywhere in the stack.

use satchel_core::CoreError;
use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading a key failed.
    ///
    /// ## When This Occurs
    /// - Stored text is not valid JSON
    /// - Stored JSON does not match the requested type
    /// - The device store failed the read
    #[error("Failed to read '{key}': {reason}")]
    ReadFailed { key: String, reason: String },

    /// Writing a key failed. No change notification was published.
    ///
    /// ## When This Occurs
    /// - The device store rejected the write (quota, I/O failure)
    /// - The value could not be serialized to JSON
    #[error("Failed to write '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    /// Key rejected before touching the device.
    #[error(transparent)]
    InvalidKey(#[from] CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool is closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Internal storage error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a ReadFailed error for a key.
    pub fn read_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::ReadFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a WriteFailed error for a key.
    pub fn write_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::WriteFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the key the failure concerns, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreError::ReadFailed { key, .. } | StoreError::WriteFailed { key, .. } => Some(key),
            StoreError::InvalidKey(CoreError::InvalidKey { key, .. }) => Some(key),
            _ => None,
        }
    }
}

/// Convert sqlx errors not tied to a single key.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolTimedOut   → StoreError::ConnectionFailed
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("Timed out acquiring a connection".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::read_failed("user", "expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "Failed to read 'user': expected value at line 1 column 1"
        );

        let err = StoreError::write_failed("user", "disk full");
        assert_eq!(err.to_string(), "Failed to write 'user': disk full");
        assert_eq!(err.key(), Some("user"));
    }

    #[test]
    fn test_pool_closed_maps_to_connection_failed() {
        let err: StoreError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, StoreError::ConnectionFailed(_)));
        assert_eq!(err.key(), None);
    }
}
