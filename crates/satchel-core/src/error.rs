//! # Error Types
//!
//! Domain error types for satchel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  satchel-core errors (this file)                                       │
//! │  └── CoreError        - Key validation, policy parsing                 │
//! │                                                                         │
//! │  satchel-store errors (separate crate)                                 │
//! │  └── StoreError       - Device read/write failures                     │
//! │                                                                         │
//! │  Shell errors (in app)                                                 │
//! │  └── ShellError       - What the UI layer sees (serialized)            │
//! │                                                                         │
//! │  Flow: CoreError → StoreError → ShellError → UI                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Core rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Storage key rejected before reaching the device.
    ///
    /// ## When This Occurs
    /// - Empty key
    /// - Key longer than [`crate::MAX_KEY_LENGTH`]
    #[error("Invalid storage key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Layout policy name not recognised.
    #[error("Unknown layout policy: '{0}'. Valid options: as_shipped, conventional")]
    UnknownLayoutPolicy(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
