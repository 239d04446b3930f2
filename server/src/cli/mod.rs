// server/src/cli/mod.rs

// This file declares the modules within the 'cli' directory and re-exports
// common types and functions for easier access from other parts of the crate.

pub mod cli; // Declare cli.rs as a submodule
pub mod handlers;

pub use cli::{start_cli, CliArgs, SchedulerCommands, ServeArgs, TrainArgs};
pub use handlers::{handle_serve_command, handle_train_command};
