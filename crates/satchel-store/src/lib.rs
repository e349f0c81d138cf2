//! # satchel-store: Device Storage for Satchel
//!
//! Durable string-keyed storage holding JSON values, with a change
//! notification published for every write.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Satchel Data Flow                                │
//! │                                                                         │
//! │  AuthResolver / session commands                                       │
//! │       │ set / get / on_change                                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   satchel-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────────┐   ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │ PersistentStore │──►│ ChangeNotifier │   │  Migrations  │  │   │
//! │  │   │ (JSON adapter)  │   │ (per-key subs) │   │  (embedded)  │  │   │
//! │  │   └────────┬────────┘   └────────────────┘   └──────────────┘  │   │
//! │  │            │                                                    │   │
//! │  │   ┌────────▼──────────────────────────────┐                    │   │
//! │  │   │ DeviceStore: Sqlite / Memory          │                    │   │
//! │  │   └───────────────────────────────────────┘                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`device`] - Device store trait and implementations
//! - [`persistent`] - JSON adapter with change publication
//! - [`notifier`] - Per-key subscriptions
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use satchel_store::{PersistentStore, SqliteDeviceStore, StoreConfig};
//!
//! let device = SqliteDeviceStore::open(StoreConfig::new("satchel.db")).await?;
//! let store = PersistentStore::new(Arc::new(device));
//!
//! let _sub = store.on_change("user", |user| println!("user is now {user:?}"));
//! store.set("user", &json!({ "uid": "u1" })).await?;
//! ```

pub mod device;
pub mod error;
pub mod migrations;
pub mod notifier;
pub mod persistent;

pub use device::{DeviceStore, MemoryDeviceStore, SqliteDeviceStore, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use notifier::{ChangeCallback, ChangeNotifier, Subscription, SubscriptionId};
pub use persistent::PersistentStore;
