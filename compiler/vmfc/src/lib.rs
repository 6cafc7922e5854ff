//! Command-line driver for the view-model factory verifier.
//!
//! The binary in `main.rs` only parses arguments and maps results to exit
//! codes; every command lives in [`commands`] and writes to caller-supplied
//! writers so it can be driven from tests.

pub mod commands;
mod error;
mod options;

pub use error::CliError;
pub use options::{parse_cli_options, CliOptions, OutputFormat, Preference};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Enable with `RUST_LOG=vmf_analysis=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
