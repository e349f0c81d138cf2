//! # Satchel Shell Entry Point
//!
//! Headless binary for the shell: frames are rendered through `tracing`.
//! Stop it with Ctrl-C.
//!
//! ## Environment
//! - `SATCHEL_CONFIG` - config file path
//! - `SATCHEL_DB_PATH` - database file path
//! - `SATCHEL_LAYOUT_POLICY` - `as_shipped` or `conventional`
//! - `RUST_LOG` - log filter

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match satchel_shell_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("satchel-shell: {err}");
            ExitCode::FAILURE
        }
    }
}
