//! # Change Notifier
//!
//! Per-key publish/subscribe registry. One notifier is owned by a
//! [`crate::PersistentStore`] and handed (cloned) to whoever wants to watch it.
//!
//! ## Delivery Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  set("user", v)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  device write ──► re-read "user" ──► dispatch(value)                   │
//! │                                          │                              │
//! │                           ┌──────────────┼──────────────┐               │
//! │                           ▼              ▼              ▼               │
//! │                       callback #1    callback #2    callback #3         │
//! │                       (registration order)                              │
//! │                                                                         │
//! │  A callback sees the store's current value, never the written one.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every registration returns a [`Subscription`] handle. Cancelling or
//! dropping the handle removes that one callback; [`ChangeNotifier::unsubscribe_all`]
//! removes everything.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::Value;
use tracing::{debug, trace};

/// Callback invoked with the freshly read value of a key.
pub type ChangeCallback = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Identifier of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Per key, callbacks in registration order.
    listeners: HashMap<String, Vec<(SubscriptionId, ChangeCallback)>>,
}

impl Registry {
    fn remove(&mut self, key: &str, id: SubscriptionId) -> bool {
        let Some(entries) = self.listeners.get_mut(key) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            self.listeners.remove(key);
        }

        removed
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Callbacks never run under the lock, so a poisoned registry is still
    // structurally sound.
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owned per-key publish/subscribe registry. Cheap to clone; clones share
/// the same registrations.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for changes to `key`.
    ///
    /// The callback stays registered until the returned handle is cancelled
    /// or dropped, or [`unsubscribe_all`](Self::unsubscribe_all) runs.
    #[must_use = "dropping the Subscription immediately unsubscribes"]
    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F) -> Subscription
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let key = key.into();
        let mut registry = lock(&self.registry);

        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);

        registry
            .listeners
            .entry(key.clone())
            .or_default()
            .push((id, Arc::new(callback)));

        debug!(%key, %id, "Subscribed to changes");

        Subscription {
            id,
            key,
            registry: Arc::downgrade(&self.registry),
            active: true,
        }
    }

    /// Removes every callback for every key. Returns how many were removed.
    ///
    /// Outstanding [`Subscription`] handles become inert.
    pub fn unsubscribe_all(&self) -> usize {
        let mut registry = lock(&self.registry);
        let removed = registry.listeners.values().map(Vec::len).sum();
        registry.listeners.clear();

        debug!(removed, "Cleared all change subscriptions");
        removed
    }

    /// Number of callbacks registered for `key`.
    pub fn listener_count(&self, key: &str) -> usize {
        lock(&self.registry)
            .listeners
            .get(key)
            .map_or(0, Vec::len)
    }

    /// Number of callbacks registered across all keys.
    pub fn total_listeners(&self) -> usize {
        lock(&self.registry).listeners.values().map(Vec::len).sum()
    }

    pub fn has_listeners(&self, key: &str) -> bool {
        self.listener_count(key) > 0
    }

    /// Invokes every callback registered for `key`, in registration order.
    ///
    /// Callbacks run on a snapshot taken outside the lock, so they may
    /// subscribe or cancel freely. Returns the number invoked.
    pub fn dispatch(&self, key: &str, value: Option<&Value>) -> usize {
        let callbacks: Vec<ChangeCallback> = {
            let registry = lock(&self.registry);
            match registry.listeners.get(key) {
                Some(entries) => entries.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
                None => return 0,
            }
        };

        for callback in &callbacks {
            callback(value);
        }

        trace!(key, delivered = callbacks.len(), "Dispatched change");
        callbacks.len()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

/// Handle to one registration.
///
/// Dropping the handle cancels the registration.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    key: String,
    registry: Weak<Mutex<Registry>>,
    active: bool,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true while the callback is still registered.
    pub fn is_active(&self) -> bool {
        if !self.active {
            return false;
        }

        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let registered = lock(&registry)
            .listeners
            .get(&self.key)
            .is_some_and(|entries| entries.iter().any(|(id, _)| *id == self.id));
        registered
    }

    /// Removes this registration. Returns false if it was already gone.
    pub fn cancel(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        if !std::mem::replace(&mut self.active, false) {
            return false;
        }

        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let removed = lock(&registry).remove(&self.key, self.id);
        if removed {
            debug!(key = %self.key, id = %self.id, "Unsubscribed from changes");
        }
        removed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
