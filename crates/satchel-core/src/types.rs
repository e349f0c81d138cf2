//! # Domain Types
//!
//! The authentication tri-state and the layout it selects.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                    ┌──────────┐                                         │
//! │                    │ Unknown  │  (initial, until first read completes)  │
//! │                    └────┬─────┘                                         │
//! │            user absent  │  user present                                 │
//! │           ┌─────────────┴─────────────┐                                 │
//! │           ▼                           ▼                                 │
//! │  ┌─────────────────┐  write   ┌───────────────┐                         │
//! │  │ Unauthenticated │ ◄──────► │ Authenticated │                         │
//! │  └─────────────────┘          └───────────────┘                         │
//! │                                                                         │
//! │  Unknown is never re-entered.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Auth State
// =============================================================================

/// Whether a current user is considered logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum AuthState {
    /// No read of the stored user has completed yet.
    #[default]
    Unknown,

    /// Stored user is absent or null.
    Unauthenticated,

    /// Stored user holds any non-null value.
    Authenticated,
}

impl AuthState {
    /// Maps a freshly read user value to a resolved state.
    ///
    /// The value is a capability token, not a schema: its shape is never
    /// inspected. Never returns [`AuthState::Unknown`].
    pub fn from_stored(user: Option<&Value>) -> Self {
        match user {
            None | Some(Value::Null) => AuthState::Unauthenticated,
            Some(_) => AuthState::Authenticated,
        }
    }

    /// Returns true once a read has completed.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Unknown)
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Unknown => write!(f, "unknown"),
            AuthState::Unauthenticated => write!(f, "unauthenticated"),
            AuthState::Authenticated => write!(f, "authenticated"),
        }
    }
}

// =============================================================================
// Layout Policy
// =============================================================================

/// Which resolved state sees the onboarding flow.
///
/// ## Why Two Policies?
/// The shipped app shows onboarding (`GetStarted`) to an *authenticated*
/// user and the tabbed app to an *unauthenticated* one. That is kept as the
/// default until product intent is confirmed; `Conventional` swaps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LayoutPolicy {
    /// Authenticated → onboarding, unauthenticated → main tabs.
    #[default]
    AsShipped,

    /// Authenticated → main tabs, unauthenticated → onboarding.
    Conventional,
}

impl std::fmt::Display for LayoutPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutPolicy::AsShipped => write!(f, "as_shipped"),
            LayoutPolicy::Conventional => write!(f, "conventional"),
        }
    }
}

impl std::str::FromStr for LayoutPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "as_shipped" | "as-shipped" | "shipped" => Ok(LayoutPolicy::AsShipped),
            "conventional" => Ok(LayoutPolicy::Conventional),
            other => Err(CoreError::UnknownLayoutPolicy(other.to_string())),
        }
    }
}

/// Config files and environment variables accept the same spellings.
impl<'de> Deserialize<'de> for LayoutPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Top-level layout handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Layout {
    /// Placeholder while the state is `Unknown`.
    Loading,

    /// Header-less stack with the single `GetStarted` screen.
    Onboarding,

    /// Bottom tabs, see [`crate::tabs::MAIN_TABS`].
    MainTabs,
}

impl Layout {
    /// Selects exactly one layout for a state.
    pub fn select(state: AuthState, policy: LayoutPolicy) -> Self {
        match (state, policy) {
            (AuthState::Unknown, _) => Layout::Loading,
            (AuthState::Authenticated, LayoutPolicy::AsShipped) => Layout::Onboarding,
            (AuthState::Unauthenticated, LayoutPolicy::AsShipped) => Layout::MainTabs,
            (AuthState::Authenticated, LayoutPolicy::Conventional) => Layout::MainTabs,
            (AuthState::Unauthenticated, LayoutPolicy::Conventional) => Layout::Onboarding,
        }
    }

    /// Route name of the layout's initial screen.
    pub fn initial_route(&self) -> Option<&'static str> {
        match self {
            Layout::Loading => None,
            Layout::Onboarding => Some("GetStarted"),
            Layout::MainTabs => Some(crate::tabs::MAIN_TABS[0].name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_are_unauthenticated() {
        assert_eq!(AuthState::from_stored(None), AuthState::Unauthenticated);
        assert_eq!(
            AuthState::from_stored(Some(&Value::Null)),
            AuthState::Unauthenticated
        );
    }

    #[test]
    fn test_any_value_is_authenticated() {
        for value in [json!({ "id": "u1" }), json!(false), json!(0), json!(""), json!([])] {
            assert_eq!(
                AuthState::from_stored(Some(&value)),
                AuthState::Authenticated,
                "value {value} should authenticate"
            );
        }
    }

    #[test]
    fn test_unknown_always_loads() {
        assert_eq!(
            Layout::select(AuthState::Unknown, LayoutPolicy::AsShipped),
            Layout::Loading
        );
        assert_eq!(
            Layout::select(AuthState::Unknown, LayoutPolicy::Conventional),
            Layout::Loading
        );
        assert!(!AuthState::Unknown.is_resolved());
    }

    #[test]
    fn test_as_shipped_branches() {
        assert_eq!(
            Layout::select(AuthState::Authenticated, LayoutPolicy::AsShipped),
            Layout::Onboarding
        );
        assert_eq!(
            Layout::select(AuthState::Unauthenticated, LayoutPolicy::AsShipped),
            Layout::MainTabs
        );
    }

    #[test]
    fn test_conventional_swaps_branches() {
        assert_eq!(
            Layout::select(AuthState::Authenticated, LayoutPolicy::Conventional),
            Layout::MainTabs
        );
        assert_eq!(
            Layout::select(AuthState::Unauthenticated, LayoutPolicy::Conventional),
            Layout::Onboarding
        );
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("as_shipped".parse::<LayoutPolicy>().unwrap(), LayoutPolicy::AsShipped);
        assert_eq!(" Conventional ".parse::<LayoutPolicy>().unwrap(), LayoutPolicy::Conventional);
        assert!("upside_down".parse::<LayoutPolicy>().is_err());
        assert_eq!(LayoutPolicy::default().to_string(), "as_shipped");
    }

    #[test]
    fn test_policy_deserializes_like_from_str() {
        for raw in ["as_shipped", "As-Shipped", " shipped ", "CONVENTIONAL"] {
            let parsed: LayoutPolicy = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(parsed, raw.parse::<LayoutPolicy>().unwrap());
        }
        assert!(serde_json::from_value::<LayoutPolicy>(json!("sideways")).is_err());
        assert_eq!(serde_json::to_string(&LayoutPolicy::Conventional).unwrap(), "\"conventional\"");
    }

    #[test]
    fn test_initial_routes() {
        assert_eq!(Layout::Loading.initial_route(), None);
        assert_eq!(Layout::Onboarding.initial_route(), Some("GetStarted"));
        assert_eq!(Layout::MainTabs.initial_route(), Some("Home"));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AuthState::Unauthenticated).unwrap(), "\"unauthenticated\"");
        assert_eq!(serde_json::to_string(&Layout::MainTabs).unwrap(), "\"mainTabs\"");
    }
}
