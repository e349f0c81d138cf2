//! # Session Commands
//!
//! Writes and reads of the persisted `"user"` record.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌────────────────┐   sign_in(user)   ┌────────────────┐               │
//! │  │ Unauthenticated│──────────────────►│ Authenticated  │               │
//! │  │  "user" = null │◄──────────────────│ "user" = {...} │               │
//! │  └────────────────┘   sign_out()      └────────────────┘               │
//! │          ▲                                    │                         │
//! │          └──────────── clear_storage() ◄──────┘                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use satchel_core::{AuthState, USER_KEY};
use satchel_store::PersistentStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ShellResult;
use crate::state::AuthResolver;

/// User record as the identity provider hands it over.
///
/// Any serializable record can be stored under `"user"`; this is the shape
/// the app itself writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityUser {
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub is_anonymous: bool,
}

impl IdentityUser {
    pub fn new(uid: impl Into<String>) -> Self {
        IdentityUser {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
            is_anonymous: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Persists `user` as the signed-in user.
pub async fn sign_in<T>(store: &PersistentStore, user: &T) -> ShellResult<()>
where
    T: Serialize + ?Sized,
{
    debug!("sign_in command");
    store.set(USER_KEY, user).await?;
    info!("User signed in");
    Ok(())
}

/// Writes an explicit `null` over the stored user.
pub async fn sign_out(store: &PersistentStore) -> ShellResult<()> {
    debug!("sign_out command");
    store.set(USER_KEY, &serde_json::Value::Null).await?;
    info!("User signed out");
    Ok(())
}

/// Reads the stored user as `T`. `None` when signed out.
pub async fn current_user<T>(store: &PersistentStore) -> ShellResult<Option<T>>
where
    T: DeserializeOwned,
{
    debug!("current_user command");
    Ok(store.get_as(USER_KEY).await?)
}

pub fn get_auth_state(resolver: &AuthResolver) -> AuthState {
    debug!("get_auth_state command");
    resolver.state()
}

/// Overwrites every stored key with `null`.
///
/// ## Returns
/// Number of keys cleared
pub async fn clear_storage(store: &PersistentStore) -> ShellResult<usize> {
    debug!("clear_storage command");
    let cleared = store.clear_all().await?;
    info!(cleared, "Storage cleared");
    Ok(cleared)
}
