//! # Commands Module
//!
//! Operations the UI layer invokes on the shell.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! └── session.rs  ◄─── Sign in/out, current user, auth state, storage reset
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI layer                                                               │
//! │  ────────                                                               │
//! │  sign_in(&store, &user).await                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  PersistentStore::set("user", user)                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  change published ──► AuthResolver ──► Shell re-renders                │
//! │                                                                         │
//! │  Commands never touch AuthState directly; they write storage and the   │
//! │  resolver observes the write.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod session;

pub use session::{
    clear_storage, current_user, get_auth_state, sign_in, sign_out, IdentityUser,
};
