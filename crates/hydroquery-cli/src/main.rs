//! hydroquery - command line client for the analytics query API.
//!
//! Exchanges the configured credentials for a bearer token and either
//! prints the token or uses it to run a single query.

mod cli;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Args;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let args = Args::parse();
    debug!(action = ?args.action, "hydroquery starting");

    let mut stdout = io::stdout();
    match cli::run(&args, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = cli::report_failure(&e, &mut stdout);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
