//! # Persistent Store
//!
//! JSON key-value adapter over a [`DeviceStore`], publishing a change
//! notification for every successful write.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set(key, value)                                                       │
//! │       │                                                                 │
//! │       ├── validate key ───────────── InvalidKey                        │
//! │       ├── serde_json::to_string ──── WriteFailed                       │
//! │       ▼                                                                 │
//! │  ┌───────────────── write lock ─────────────────┐                      │
//! │  │  device.set_item ─────────────── WriteFailed │ (nothing published)  │
//! │  │       │                                      │                      │
//! │  │       ▼                                      │                      │
//! │  │  re-read key ──► notifier.dispatch(value)    │                      │
//! │  └──────────────────────────────────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Holding the lock across write and dispatch means two racing `set` calls
//! notify in durable-write order, so the last callback always sees the last
//! write.

use std::sync::Arc;

use satchel_core::validation::validate_key;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::device::DeviceStore;
use crate::error::{StoreError, StoreResult};
use crate::notifier::{ChangeNotifier, Subscription};

/// JSON key-value store with change notification. Clones share the device,
/// the notifier and the write lock.
#[derive(Clone)]
pub struct PersistentStore {
    device: Arc<dyn DeviceStore>,
    notifier: ChangeNotifier,
    write_lock: Arc<Mutex<()>>,
}

impl PersistentStore {
    /// Wraps a device store with a fresh notifier.
    pub fn new(device: Arc<dyn DeviceStore>) -> Self {
        Self::with_notifier(device, ChangeNotifier::new())
    }

    /// Wraps a device store, publishing through an existing notifier.
    pub fn with_notifier(device: Arc<dyn DeviceStore>, notifier: ChangeNotifier) -> Self {
        PersistentStore {
            device,
            notifier,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The notifier writes are published through.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn device(&self) -> &Arc<dyn DeviceStore> {
        &self.device
    }

    /// Registers `callback` for writes to `key`. Shorthand for
    /// `self.notifier().subscribe(key, callback)`.
    #[must_use = "dropping the Subscription immediately unsubscribes"]
    pub fn on_change<F>(&self, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        self.notifier.subscribe(key, callback)
    }

    /// Serializes `value`, writes it under `key`, then publishes a change
    /// for `key`.
    ///
    /// ## Errors
    /// * `InvalidKey` - key rejected, nothing written
    /// * `WriteFailed` - serialization or device write failed, nothing published
    pub async fn set<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        validate_key(key)?;

        let text = serde_json::to_string(value).map_err(|e| StoreError::write_failed(key, e))?;
        self.write_and_publish(key, &text).await
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` when nothing was written, the text is empty, or the
    /// stored value is JSON `null`.
    ///
    /// ## Errors
    /// * `ReadFailed` - stored text is not JSON, or the device read failed
    pub async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        validate_key(key)?;
        self.read_value(key).await
    }

    /// Reads and parses `key` without validating it. Keys reaching this
    /// point either passed validation or came from the device itself.
    async fn read_value(&self, key: &str) -> StoreResult<Option<Value>> {
        let Some(text) = self.device.get_item(key).await? else {
            return Ok(None);
        };

        if text.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(StoreError::read_failed(key, e)),
        }
    }

    /// Reads and deserializes the value stored under `key`.
    pub async fn get_as<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::read_failed(key, e)),
            None => Ok(None),
        }
    }

    /// Writes `null` under every key the device holds.
    ///
    /// Each key is written and published like a [`set`](Self::set), so every
    /// watcher sees an ordinary change. Returns the number of keys cleared.
    pub async fn clear_all(&self) -> StoreResult<usize> {
        let keys = self.device.all_keys().await?;

        // Keys come from the device, so they are cleared even when they
        // would not pass validation as new keys.
        for key in &keys {
            self.write_and_publish(key, "null").await?;
        }

        info!(cleared = keys.len(), "Cleared persistent store");
        Ok(keys.len())
    }

    /// Writes already-serialized `text` under `key` and publishes the change,
    /// all under the write lock.
    async fn write_and_publish(&self, key: &str, text: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Err(err) = self.device.set_item(key, text).await {
            error!(key, error = %err, "Write rejected by device store");
            return Err(err);
        }

        let delivered = self.publish(key).await;
        debug!(key, delivered, "Value stored");

        Ok(())
    }

    /// Re-reads `key` and hands the fresh value to its subscribers.
    ///
    /// Skips the read entirely when nobody is listening. A failed re-read is
    /// logged and delivers nothing.
    async fn publish(&self, key: &str) -> usize {
        if !self.notifier.has_listeners(key) {
            return 0;
        }

        match self.read_value(key).await {
            Ok(value) => self.notifier.dispatch(key, value.as_ref()),
            Err(err) => {
                error!(key, error = %err, "Re-read after write failed, change not delivered");
                0
            }
        }
    }
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore")
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{MemoryDeviceStore, SqliteDeviceStore, StoreConfig};
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    /// Device store that rejects every write.
    struct RejectingDevice;

    #[async_trait]
    impl DeviceStore for RejectingDevice {
        async fn get_item(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        async fn set_item(&self, key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::write_failed(key, "quota exceeded"))
        }

        async fn all_keys(&self) -> StoreResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn memory_store() -> PersistentStore {
        PersistentStore::new(Arc::new(MemoryDeviceStore::new()))
    }

    async fn sqlite_store() -> PersistentStore {
        let device = SqliteDeviceStore::open(StoreConfig::in_memory()).await.unwrap();
        PersistentStore::new(Arc::new(device))
    }

    fn capture(store: &PersistentStore, key: &str) -> (Arc<StdMutex<Vec<Option<Value>>>>, Subscription) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = store.on_change(key, move |value| sink.lock().unwrap().push(value.cloned()));
        (seen, sub)
    }

    #[tokio::test]
    async fn test_values_read_back_equal() {
        let store = sqlite_store().await;
        let values = [
            json!({ "id": "u1", "roles": ["buyer"], "meta": { "age": 3 } }),
            json!("plain string"),
            json!(42),
            json!(-1.5),
            json!(true),
            json!([1, "two", null]),
        ];

        for value in values {
            store.set("k", &value).await.unwrap();
            assert_eq!(store.get("k").await.unwrap(), Some(value));
        }
    }

    #[tokio::test]
    async fn test_null_reads_as_absent() {
        let store = sqlite_store().await;
        store.set("k", &json!({ "a": 1 })).await.unwrap();
        store.set("k", &Value::Null).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.get("never-written").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_text_reads_as_absent() {
        let device = MemoryDeviceStore::with_entries([("user", "")]);
        let store = PersistentStore::new(Arc::new(device));

        assert_eq!(store.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_text_is_read_error() {
        let device = MemoryDeviceStore::with_entries([("user", "{not json")]);
        let store = PersistentStore::new(Arc::new(device));

        let err = store.get("user").await.unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed { ref key, .. } if key == "user"));
    }

    #[tokio::test]
    async fn test_typed_read() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Profile {
            uid: String,
            visits: u32,
        }

        let store = memory_store();
        let profile = Profile { uid: "u1".into(), visits: 3 };
        store.set("profile", &profile).await.unwrap();

        assert_eq!(store.get_as::<Profile>("profile").await.unwrap(), Some(profile));

        let err = store.get_as::<u32>("profile").await.unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed { .. }));
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let store = memory_store();
        let (seen, _sub) = capture(&store, "user");

        assert!(matches!(
            store.set("", &json!(1)).await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get("").await, Err(StoreError::InvalidKey(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_notifies_with_fresh_value() {
        let store = memory_store();
        let (seen, _sub) = capture(&store, "user");

        store.set("user", &json!({ "uid": "u1" })).await.unwrap();
        store.set("user", &Value::Null).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some(json!({ "uid": "u1" })), None]
        );
    }

    #[tokio::test]
    async fn test_rejected_write_publishes_nothing() {
        let store = PersistentStore::new(Arc::new(RejectingDevice));
        let (seen, _sub) = capture(&store, "user");

        let err = store.set("user", &json!({ "uid": "u1" })).await.unwrap_err();

        assert!(matches!(err, StoreError::WriteFailed { .. }));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unserializable_value_is_write_error() {
        use std::collections::HashMap;

        let store = memory_store();
        let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
        bad.insert((1, 2), 3);

        let err = store.set("k", &bad).await.unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed { .. }));
        assert_eq!(store.device().all_keys().await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_clear_all_nulls_every_key_and_notifies() {
        let store = sqlite_store().await;
        store.set("user", &json!({ "uid": "u1" })).await.unwrap();
        store.set("cart", &json!([1, 2])).await.unwrap();
        store.set("theme", &json!("light")).await.unwrap();

        let (seen_user, _u) = capture(&store, "user");
        let (seen_cart, _c) = capture(&store, "cart");

        let cleared = store.clear_all().await.unwrap();

        assert_eq!(cleared, 3);
        for key in ["user", "cart", "theme"] {
            assert_eq!(store.get(key).await.unwrap(), None, "{key} should be cleared");
        }
        assert_eq!(*seen_user.lock().unwrap(), vec![None]);
        assert_eq!(*seen_cart.lock().unwrap(), vec![None]);
        // Keys are nulled, not removed.
        assert_eq!(store.device().all_keys().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_clear_all_reaches_keys_that_fail_validation() {
        let long_key = "k".repeat(300);
        let device = Arc::new(MemoryDeviceStore::with_entries([
            (long_key.as_str(), "1"),
            ("", "\"legacy\""),
            ("user", r#"{"id":"u1"}"#),
        ]));
        let store = PersistentStore::new(device.clone());
        let (seen_user, _u) = capture(&store, "user");
        let (seen_long, _l) = capture(&store, &long_key);

        let cleared = store.clear_all().await.unwrap();

        assert_eq!(cleared, 3);
        assert_eq!(store.get("user").await.unwrap(), None);
        assert_eq!(*seen_user.lock().unwrap(), vec![None]);
        assert_eq!(*seen_long.lock().unwrap(), vec![None]);
        assert_eq!(device.get_item(&long_key).await.unwrap().as_deref(), Some("null"));
        assert_eq!(device.get_item("").await.unwrap().as_deref(), Some("null"));
    }

    #[tokio::test]
    async fn test_concurrent_writes_last_durable_write_wins() {
        let store = sqlite_store().await;
        let (seen, _sub) = capture(&store, "user");

        let a = json!({ "uid": "a" });
        let b = json!({ "uid": "b" });

        let (ra, rb) = tokio::join!(store.set("user", &a), store.set("user", &b));
        ra.unwrap();
        rb.unwrap();

        let stored = store.get("user").await.unwrap().unwrap();
        assert!(stored == a || stored == b);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.last().cloned().flatten(), Some(stored));
    }

    #[tokio::test]
    async fn test_no_reread_without_listeners() {
        let device = MemoryDeviceStore::new();
        let store = PersistentStore::new(Arc::new(device));

        store.set("user", &json!(1)).await.unwrap();
        assert_eq!(store.notifier().total_listeners(), 0);
    }
}
