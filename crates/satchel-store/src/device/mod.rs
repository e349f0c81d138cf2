//! # Device Store
//!
//! The on-device asynchronous string store that [`crate::PersistentStore`]
//! wraps. Implementations only move text; JSON lives one layer up.
//!
//! ## Implementations
//!
//! - [`SqliteDeviceStore`] - durable, survives restarts
//! - [`MemoryDeviceStore`] - process-local, for tests and throwaway sessions

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use memory::MemoryDeviceStore;
pub use sqlite::{SqliteDeviceStore, StoreConfig};

/// Async string store keyed by string.
///
/// There is deliberately no delete: a cleared key is written as `"null"`.
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Returns the raw text stored under `key`, or `None` if never written.
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Durably stores `value` under `key`, replacing any previous text.
    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Every key currently held by the store.
    async fn all_keys(&self) -> StoreResult<Vec<String>>;
}
