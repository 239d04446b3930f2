// server/src/main.rs

// This is the main entry point for the scheduler server application.
// It handles command-line argument parsing and dispatches to the CLI logic.

use scheduler_server::cli::cli::start_cli;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Call the main CLI entry point from the cli module
    start_cli().await
}
