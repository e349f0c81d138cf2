//! # Authentication State
//!
//! Resolves the tri-state [`AuthState`] from the persisted `"user"` value
//! and keeps it current as that value is rewritten.
//!
//! ## Bootstrap Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  bootstrap()                                                           │
//! │     │                                                                   │
//! │     ├── phase != NotStarted? ──► no-op, return current state           │
//! │     │                                                                   │
//! │     ├── 1. subscribe("user")  ──► every later write re-runs mapping    │
//! │     │                                                                   │
//! │     ├── 2. get("user")                                                 │
//! │     │        ├── Ok  ──► apply mapping, but only while still Unknown   │
//! │     │        └── Err ──► stay Unknown (loading forever), return Err    │
//! │     │                                                                   │
//! │     └── phase = Done                                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Subscribing first means a write racing the initial read is never missed;
//! the "only while Unknown" rule means that write's fresher value is never
//! overwritten by the older initial read.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use satchel_core::{AuthState, USER_KEY};
use satchel_store::{PersistentStore, StoreResult, Subscription};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Progress of the one-shot bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    NotStarted,
    InProgress,
    Done,
}

/// Owner of the current [`AuthState`].
///
/// Nothing else writes the state; UI code only reads it through
/// [`state`](Self::state) or [`watch`](Self::watch).
pub struct AuthResolver {
    store: PersistentStore,
    state_tx: Arc<watch::Sender<AuthState>>,
    phase: Mutex<BootstrapPhase>,
    subscription: Mutex<Option<Subscription>>,
    recomputations: Arc<AtomicU64>,
}

impl AuthResolver {
    /// Creates a resolver in `Unknown`. Nothing is read until
    /// [`bootstrap`](Self::bootstrap).
    pub fn new(store: PersistentStore) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Unknown);

        AuthResolver {
            store,
            state_tx: Arc::new(state_tx),
            phase: Mutex::new(BootstrapPhase::NotStarted),
            subscription: Mutex::new(None),
            recomputations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reads the stored user once and watches it from then on.
    ///
    /// Only the first call does anything; later calls return the current
    /// state without registering another subscription.
    ///
    /// ## Errors
    /// The initial read's `ReadFailed`. The state stays `Unknown` until a
    /// later write to `"user"` is observed.
    pub async fn bootstrap(&self) -> StoreResult<AuthState> {
        {
            let mut phase = self.phase.lock().unwrap_or_else(|p| p.into_inner());
            if *phase != BootstrapPhase::NotStarted {
                debug!(phase = ?*phase, "Bootstrap already started, ignoring");
                return Ok(self.state());
            }
            *phase = BootstrapPhase::InProgress;
        }

        info!("Resolving authentication state");

        let subscription = self.watch_user();
        *self.subscription.lock().unwrap_or_else(|p| p.into_inner()) = Some(subscription);

        let initial = self.store.get(USER_KEY).await;
        self.set_phase(BootstrapPhase::Done);

        match initial {
            Ok(user) => {
                let resolved = AuthState::from_stored(user.as_ref());
                let applied = self.state_tx.send_if_modified(|state| {
                    if *state == AuthState::Unknown {
                        *state = resolved;
                        true
                    } else {
                        false
                    }
                });

                if applied {
                    info!(state = %resolved, "Authentication state resolved");
                } else {
                    debug!(
                        current = %self.state(),
                        "A newer write resolved the state first, initial read discarded"
                    );
                }
                Ok(self.state())
            }
            Err(err) => {
                error!(error = %err, "Could not read stored user, staying in loading state");
                Err(err)
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> AuthState {
        *self.state_tx.borrow()
    }

    /// Receiver notified whenever the state changes value.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn phase(&self) -> BootstrapPhase {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Number of times a change notification re-ran the mapping.
    pub fn recomputations(&self) -> u64 {
        self.recomputations.load(Ordering::SeqCst)
    }

    /// Whether the resolver still holds its `"user"` subscription.
    pub fn is_watching(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Cancels the resolver's subscription. The state keeps its last value.
    pub fn release(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();

        if let Some(subscription) = subscription {
            subscription.cancel();
            debug!("Auth resolver released its subscription");
        }
    }

    fn set_phase(&self, next: BootstrapPhase) {
        *self.phase.lock().unwrap_or_else(|p| p.into_inner()) = next;
    }

    fn watch_user(&self) -> Subscription {
        let state_tx = Arc::clone(&self.state_tx);
        let recomputations = Arc::clone(&self.recomputations);

        self.store.on_change(USER_KEY, move |user| {
            recomputations.fetch_add(1, Ordering::SeqCst);
            let next = AuthState::from_stored(user);

            let changed = state_tx.send_if_modified(|state| {
                if *state == next {
                    false
                } else {
                    *state = next;
                    true
                }
            });

            if changed {
                info!(state = %next, "Authentication state changed");
            }
        })
    }
}

impl std::fmt::Debug for AuthResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResolver")
            .field("state", &self.state())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_store::{MemoryDeviceStore, SqliteDeviceStore, StoreConfig};
    use serde_json::{json, Value};

    async fn sqlite_store() -> PersistentStore {
        let device = SqliteDeviceStore::open(StoreConfig::in_memory()).await.unwrap();
        PersistentStore::new(Arc::new(device))
    }

    #[tokio::test]
    async fn test_starts_unknown() {
        let resolver = AuthResolver::new(sqlite_store().await);
        assert_eq!(resolver.state(), AuthState::Unknown);
        assert_eq!(resolver.phase(), BootstrapPhase::NotStarted);
    }

    #[tokio::test]
    async fn test_no_user_resolves_unauthenticated() {
        let resolver = AuthResolver::new(sqlite_store().await);

        let state = resolver.bootstrap().await.unwrap();

        assert_eq!(state, AuthState::Unauthenticated);
        assert_eq!(resolver.phase(), BootstrapPhase::Done);
        assert!(resolver.is_watching());
    }

    #[tokio::test]
    async fn test_stored_user_resolves_authenticated() {
        let store = sqlite_store().await;
        store.set(USER_KEY, &json!({ "id": "u1" })).await.unwrap();

        let resolver = AuthResolver::new(store);
        assert_eq!(resolver.bootstrap().await.unwrap(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_sign_out_recomputes_once() {
        let store = sqlite_store().await;
        store.set(USER_KEY, &json!({ "id": "u1" })).await.unwrap();
        let resolver = AuthResolver::new(store.clone());
        resolver.bootstrap().await.unwrap();

        store.set(USER_KEY, &Value::Null).await.unwrap();

        assert_eq!(resolver.recomputations(), 1);
        assert_eq!(resolver.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_watch_sees_transitions() {
        let store = sqlite_store().await;
        let resolver = AuthResolver::new(store.clone());
        let mut rx = resolver.watch();

        resolver.bootstrap().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), AuthState::Unauthenticated);

        store.set(USER_KEY, &json!({ "id": "u1" })).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), AuthState::Authenticated);

        // Same state again: recomputed, but no change published.
        store.set(USER_KEY, &json!({ "id": "u2" })).await.unwrap();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(resolver.recomputations(), 2);
    }

    #[tokio::test]
    async fn test_second_bootstrap_is_noop() {
        let store = sqlite_store().await;
        let resolver = AuthResolver::new(store.clone());

        resolver.bootstrap().await.unwrap();
        resolver.bootstrap().await.unwrap();

        assert_eq!(store.notifier().listener_count(USER_KEY), 1);

        store.set(USER_KEY, &json!({ "id": "u1" })).await.unwrap();
        assert_eq!(resolver.recomputations(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_user_stays_unknown_until_rewritten() {
        let device = MemoryDeviceStore::with_entries([(USER_KEY, "{oops")]);
        let store = PersistentStore::new(Arc::new(device));
        let resolver = AuthResolver::new(store.clone());

        assert!(resolver.bootstrap().await.is_err());
        assert_eq!(resolver.state(), AuthState::Unknown);
        assert_eq!(resolver.phase(), BootstrapPhase::Done);

        // A retry is a no-op, not a second subscription.
        assert_eq!(resolver.bootstrap().await.unwrap(), AuthState::Unknown);
        assert_eq!(store.notifier().listener_count(USER_KEY), 1);

        store.set(USER_KEY, &json!({ "id": "u1" })).await.unwrap();
        assert_eq!(resolver.state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_release_stops_recomputation() {
        let store = sqlite_store().await;
        let resolver = AuthResolver::new(store.clone());
        resolver.bootstrap().await.unwrap();

        resolver.release();
        store.set(USER_KEY, &json!({ "id": "u1" })).await.unwrap();

        assert!(!resolver.is_watching());
        assert_eq!(resolver.recomputations(), 0);
        assert_eq!(resolver.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_concurrent_writes_final_state_matches_storage() {
        let store = sqlite_store().await;
        let resolver = AuthResolver::new(store.clone());
        resolver.bootstrap().await.unwrap();

        let user = json!({ "id": "u1" });
        let (a, b) = tokio::join!(
            store.set(USER_KEY, &user),
            store.set(USER_KEY, &Value::Null)
        );
        a.unwrap();
        b.unwrap();

        let stored = store.get(USER_KEY).await.unwrap();
        assert_eq!(resolver.state(), AuthState::from_stored(stored.as_ref()));
    }
}
