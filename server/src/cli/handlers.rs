// server/src/cli/handlers.rs

use anyhow::{Context, Result};
use log::info;
use std::fs;
use tokio::sync::oneshot;

use crate::cli::cli::{ServeArgs, TrainArgs};
use ml::dataset::{generate_schedule_records, DatasetConfig};
use ml::forest::ForestConfig;
use ml::training::{train_wait_time_model, TrainingConfig};
use models::ScheduleRecord;
use rest_api::{load_rest_api_config, start_server};

/// Trains a wait-time model from a record file or synthetic data and writes
/// the versioned artifacts to the output directory.
pub fn handle_train_command(args: TrainArgs) -> Result<()> {
    let records = load_or_generate_records(&args)?;

    if let Some(path) = &args.save_data {
        let raw = serde_json::to_string_pretty(&records)
            .context("Failed to serialize schedule records")?;
        fs::write(path, raw)
            .context(format!("Failed to write schedule records to {}", path.display()))?;
        println!("Wrote {} schedule records to {}", records.len(), path.display());
    }

    let config = TrainingConfig {
        forest: ForestConfig {
            n_estimators: args.trees,
            seed: args.seed,
            ..ForestConfig::default()
        },
        test_fraction: args.test_fraction,
        seed: args.seed,
    };
    let model = train_wait_time_model(&records, &config)?;

    let metrics = model.metrics();
    println!("Model performance (wait_time):");
    println!("  train RMSE {:>8.2}    test RMSE {:>8.2}", metrics.train_rmse, metrics.test_rmse);
    println!("  train MAE  {:>8.2}    test MAE  {:>8.2}", metrics.train_mae, metrics.test_mae);
    println!("  train R2   {:>8.3}    test R2   {:>8.3}", metrics.train_r2, metrics.test_r2);
    println!("Top feature importances:");
    for (name, share) in model.feature_importance().iter().take(5) {
        println!("  {:<24} {:.3}", name, share);
    }

    model.save(&args.out)?;
    println!("Saved model artifacts to {}", args.out.display());
    Ok(())
}

fn load_or_generate_records(args: &TrainArgs) -> Result<Vec<ScheduleRecord>> {
    match &args.data {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .context(format!("Failed to read schedule records from {}", path.display()))?;
            let records: Vec<ScheduleRecord> = serde_json::from_str(&raw)
                .context(format!("Failed to parse schedule records in {}", path.display()))?;
            println!("Loaded {} schedule records from {}", records.len(), path.display());
            Ok(records)
        }
        None => {
            let config = DatasetConfig {
                num_records: args.samples,
                seed: args.seed,
                ..DatasetConfig::default()
            };
            let records = generate_schedule_records(&config)?;
            println!("Generated {} synthetic schedule records (seed {})", records.len(), args.seed);
            Ok(records)
        }
    }
}

/// Resolves the REST configuration, applies CLI overrides, and runs the API
/// server until Ctrl-C.
pub async fn handle_serve_command(args: ServeArgs) -> Result<()> {
    let mut rest_config = load_rest_api_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        rest_config.host = host;
    }
    if let Some(port) = args.port {
        rest_config.port = port;
    }
    if let Some(model_dir) = args.model_dir {
        rest_config.model_directory = model_dir;
    }

    info!(
        "Starting wait-time REST API on {}:{} with artifacts from {}",
        rest_config.host,
        rest_config.port,
        rest_config.model_directory.display()
    );

    // The sender must outlive the server future or the receiver resolves
    // immediately and the server exits before binding.
    let (_shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    start_server(rest_config, shutdown_rx).await
}
