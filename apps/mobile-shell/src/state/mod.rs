//! # State Module
//!
//! Long-lived state owned by the shell.
//!
//! - [`auth`] - `AuthResolver`, the only writer of `AuthState`
//! - [`config`] - `ShellConfig`, read once at startup

pub mod auth;
pub mod config;

pub use auth::{AuthResolver, BootstrapPhase};
pub use config::ShellConfig;
