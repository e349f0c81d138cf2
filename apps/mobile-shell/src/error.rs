//! # Shell Error Type
//!
//! Unified error type for shell commands and startup.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Satchel                                │
//! │                                                                         │
//! │  UI layer                    Rust shell                                 │
//! │  ────────                    ──────────                                 │
//! │                                                                         │
//! │  signIn(user)                                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ShellError>                                           │  │
//! │  │         │                                                        │  │
//! │  │  Storage error? ── StoreError::WriteFailed ──┐                   │  │
//! │  │         │                                    ▼                   │  │
//! │  │  Bad key / policy? ── CoreError ─────────► ShellError ─────────►│  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no user-facing error surface beyond these codes; a failed
//! bootstrap shows up as a loading screen that never resolves.

use satchel_core::CoreError;
use satchel_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Error returned from shell commands and startup.
///
/// ## Serialization
/// ```json
/// {
///   "code": "STORAGE_WRITE",
///   "message": "Could not save 'user'"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ShellError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for shell responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Stored content unreadable or device read failed
    StorageRead,

    /// Device rejected a write
    StorageWrite,

    /// Bad key or other rejected input
    InvalidInput,

    /// Configuration could not be loaded or is invalid
    Config,

    /// Anything else
    Internal,
}

impl ShellError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ShellError {
            code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ShellError::new(ErrorCode::Config, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ShellError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to shell errors.
impl From<StoreError> for ShellError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ReadFailed { key, reason } => {
                tracing::error!(%key, %reason, "Storage read failed");
                ShellError::new(ErrorCode::StorageRead, format!("Could not read '{key}'"))
            }
            StoreError::WriteFailed { key, reason } => {
                tracing::error!(%key, %reason, "Storage write failed");
                ShellError::new(ErrorCode::StorageWrite, format!("Could not save '{key}'"))
            }
            StoreError::InvalidKey(e) => e.into(),
            StoreError::ConnectionFailed(e) => {
                tracing::error!("Storage connection failed: {}", e);
                ShellError::internal("Storage unavailable")
            }
            StoreError::MigrationFailed(e) => {
                tracing::error!("Storage migration failed: {}", e);
                ShellError::internal("Storage migration failed")
            }
            StoreError::Internal(e) => {
                tracing::error!("Internal storage error: {}", e);
                ShellError::internal("Storage operation failed")
            }
        }
    }
}

/// Converts core errors to shell errors.
impl From<CoreError> for ShellError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidKey { .. } => ShellError::new(ErrorCode::InvalidInput, err.to_string()),
            CoreError::UnknownLayoutPolicy(_) => ShellError::config(err.to_string()),
        }
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::internal(format!("I/O error: {err}"))
    }
}

impl From<toml::de::Error> for ShellError {
    fn from(err: toml::de::Error) -> Self {
        ShellError::config(format!("Invalid config file: {err}"))
    }
}

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_codes() {
        let err: ShellError = StoreError::read_failed("user", "bad json").into();
        assert_eq!(err.code, ErrorCode::StorageRead);
        assert_eq!(err.message, "Could not read 'user'");

        let err: ShellError = StoreError::write_failed("user", "disk full").into();
        assert_eq!(err.code, ErrorCode::StorageWrite);
    }

    #[test]
    fn test_invalid_key_is_input_error() {
        let core = CoreError::InvalidKey {
            key: String::new(),
            reason: "must not be empty".into(),
        };
        let err: ShellError = StoreError::InvalidKey(core).into();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ShellError::config("missing store path");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "CONFIG");
        assert_eq!(json["message"], "missing store path");
        assert_eq!(err.to_string(), "[Config] missing store path");
    }
}
