// server/src/cli/cli.rs

// Command-line surface for the scheduler: train a model, serve predictions.

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::handlers::{handle_serve_command, handle_train_command};

// CLI entry point for the wait-time scheduler
#[derive(Parser, Debug)]
#[command(name = "scheduler-cli")]
#[command(version = "0.1.0")]
#[command(about = "Hospital wait-time prediction service CLI")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<SchedulerCommands>,
}

/// Subcommands for the scheduler CLI
#[derive(Subcommand, Debug)]
pub enum SchedulerCommands {
    /// Train a wait-time model and write its artifacts to disk
    Train(TrainArgs),
    /// Serve the prediction REST API
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// JSON file of schedule records; omitted means synthetic data
    #[clap(long, short = 'd', value_hint = clap::ValueHint::FilePath)]
    pub data: Option<PathBuf>,
    /// How many synthetic records to generate when no data file is given
    #[clap(long, short = 'n', default_value_t = 10_000)]
    pub samples: usize,
    #[clap(long, default_value_t = 42)]
    pub seed: u64,
    #[clap(long, default_value_t = 100)]
    pub trees: usize,
    #[clap(long, default_value_t = 0.2)]
    pub test_fraction: f64,
    /// Write the training records out as JSON before fitting
    #[clap(long, value_hint = clap::ValueHint::FilePath)]
    pub save_data: Option<PathBuf>,
    /// Directory that receives the model, encoder, and metrics files
    #[clap(long, short = 'o', default_value = "model_artifacts", value_hint = clap::ValueHint::DirPath)]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[clap(long, short = 'c', value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[clap(long)]
    pub host: Option<String>,
    #[clap(long, short = 'p', env = "SCHEDULER_REST_PORT")]
    pub port: Option<u16>,
    #[clap(long, short = 'm', value_hint = clap::ValueHint::DirPath)]
    pub model_dir: Option<PathBuf>,
}

pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();

    match args.command {
        Some(SchedulerCommands::Train(train_args)) => handle_train_command(train_args),
        Some(SchedulerCommands::Serve(serve_args)) => handle_serve_command(serve_args).await,
        None => {
            let mut help = CliArgs::command();
            help.print_help().context("Failed to render CLI help")?;
            Ok(())
        }
    }
}
