//! # Validation Module
//!
//! Storage key checks run before any device access.
//!
//! ## Usage
//! ```rust
//! use satchel_core::validation::validate_key;
//!
//! validate_key("user").unwrap();
//! assert!(validate_key("").is_err());
//! ```

use crate::error::{CoreError, CoreResult};
use crate::MAX_KEY_LENGTH;

/// Validates a storage key.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_KEY_LENGTH`] characters
pub fn validate_key(key: &str) -> CoreResult<()> {
    if key.is_empty() {
        return Err(CoreError::InvalidKey {
            key: key.to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    if key.chars().count() > MAX_KEY_LENGTH {
        return Err(CoreError::InvalidKey {
            key: key.chars().take(32).collect::<String>() + "...",
            reason: format!("must be at most {MAX_KEY_LENGTH} characters"),
        });
    }

    Ok(())
}
