//! # Satchel Shell Library
//!
//! Core library for the Satchel mobile shell.
//! This is the main entry point that wires storage, auth resolution and
//! layout rendering together and runs them until shutdown.
//!
//! ## Module Organization
//! ```text
//! satchel_shell_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── shell.rs        ◄─── Layout selection, Renderer seam, teardown
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── auth.rs     ◄─── AuthResolver (bootstrap + watch)
//! │   └── config.rs   ◄─── ShellConfig (file + env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   └── session.rs  ◄─── sign_in, sign_out, current_user, ...
//! └── error.rs        ◄─── Shell error type
//! ```
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Shell                                                                  │
//! │    ├── PersistentStore ───────► Arc<dyn DeviceStore> (SQLite on disk)   │
//! │    │        └── ChangeNotifier (shared with every clone of the store)   │
//! │    ├── Arc<AuthResolver> ─────► holds the only "user" subscription      │
//! │    └── Arc<dyn Renderer>                                                │
//! │                                                                         │
//! │  Dropping the Shell tears down every subscription on the store.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod shell;
pub mod state;

use std::sync::Arc;

use satchel_store::{PersistentStore, SqliteDeviceStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::{ShellError, ShellResult};
use shell::{Shell, TracingRenderer};
use state::ShellConfig;

/// Runs the shell until Ctrl-C.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • shell.toml (SATCHEL_CONFIG or platform config dir)                │
/// │     • SATCHEL_DB_PATH / SATCHEL_LAYOUT_POLICY overrides                 │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • RUST_LOG wins over [logging].filter                               │
/// │                                                                         │
/// │  3. Open Device Store ────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  4. Start Shell ──────────────────────────────────────────────────────► │
/// │     • Bootstrap auth state, render first frame                          │
/// │     • Re-render on every auth state change                              │
/// │                                                                         │
/// │  5. Shutdown ─────────────────────────────────────────────────────────► │
/// │     • Tear down subscriptions, close the pool                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> ShellResult<()> {
    let config = ShellConfig::load(None)?;
    init_tracing(&config.logging.filter)?;

    info!("Starting Satchel shell");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: ShellConfig) -> ShellResult<()> {
    let store_config = config.store_config()?;
    info!(db_path = ?store_config.database_path, "Database path determined");

    let device = Arc::new(SqliteDeviceStore::open(store_config).await?);
    info!("Device store opened and migrations applied");

    let store = PersistentStore::new(device.clone());
    let mut shell = Shell::new(store, Arc::new(TracingRenderer), config.layout.policy);

    // A failed bootstrap leaves the loading frame up; keep running so a
    // later write can still resolve it.
    if let Err(err) = shell.start().await {
        tracing::warn!(error = %err, "Shell started without a resolved auth state");
    }

    let outcome = shell
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Could not listen for Ctrl-C");
            }
        })
        .await;

    drop(shell);
    device.close().await;
    info!("Satchel shell stopped");

    outcome
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=satchel=trace` - Show trace for satchel crates only
/// - Default: `[logging].filter` from the config
fn init_tracing(default_filter: &str) -> ShellResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ShellError::internal(format!("Could not initialize logging: {e}")))
}
