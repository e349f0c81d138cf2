//! # satchel-core: Pure Rules for the Satchel Shell
//!
//! Everything the shell decides without touching a device: how a stored user
//! maps to an authentication state, which top-level layout that state selects,
//! what the main tabs look like, and which storage keys are acceptable.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Satchel Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI framework (Renderer impl)                   │   │
//! │  │        Loading ──► Onboarding (GetStarted) ──► Main tabs       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Layout                                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  mobile-shell (Shell, AuthResolver)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ satchel-core (THIS CRATE) ★                     │   │
//! │  │   AuthState · Layout · LayoutPolicy · TabSpec · validation      │   │
//! │  │   NO I/O • NO STORAGE • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            satchel-store (device storage + notifier)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `AuthState`, `Layout`, `LayoutPolicy`
//! - [`tabs`] - Main tab descriptors and tint rules
//! - [`validation`] - Storage key validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use satchel_core::{AuthState, Layout, LayoutPolicy};
//! use serde_json::json;
//!
//! let state = AuthState::from_stored(Some(&json!({ "uid": "u1" })));
//! assert_eq!(state, AuthState::Authenticated);
//!
//! let layout = Layout::select(state, LayoutPolicy::AsShipped);
//! assert_eq!(layout, Layout::Onboarding);
//! ```

pub mod error;
pub mod tabs;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use tabs::{TabSpec, TabStyle, MAIN_TABS};
pub use types::{AuthState, Layout, LayoutPolicy};

/// Storage key holding the identity provider's current user.
pub const USER_KEY: &str = "user";

/// Maximum accepted length of a storage key, in characters.
pub const MAX_KEY_LENGTH: usize = 256;
