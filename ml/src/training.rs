// ml/src/training.rs

//! End-to-end training pipeline: encode, split, fit, score.

use log::info;
use models::{ScheduleRecord, SchedulerError, SchedulerResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::encoding::EncodingVocabulary;
use crate::forest::{ForestConfig, RandomForestRegressor};
use crate::metrics::{ModelMetrics, RegressionMetrics};
use crate::model::WaitTimeModel;

/// Pipeline settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    pub forest: ForestConfig,
    /// Share of rows held out for test metrics, inside (0, 1).
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Shuffles `0..len` with the seed and splits off a test share. Both splits
/// are guaranteed non-empty.
pub fn train_test_split(
    len: usize,
    test_fraction: f64,
    seed: u64,
) -> SchedulerResult<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(SchedulerError::TrainingError(format!(
            "test fraction must be inside (0, 1), got {}",
            test_fraction
        )));
    }
    let test_len = (len as f64 * test_fraction).round() as usize;
    if test_len == 0 || test_len >= len {
        return Err(SchedulerError::TrainingError(format!(
            "{} rows cannot support a test fraction of {}",
            len, test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let test = indices.split_off(len - test_len);
    Ok((indices, test))
}

/// Fits a wait-time model on labeled records and scores it on a held-out
/// split.
pub fn train_wait_time_model(
    records: &[ScheduleRecord],
    config: &TrainingConfig,
) -> SchedulerResult<WaitTimeModel> {
    info!("Training wait-time model on {} records", records.len());

    let vocabulary = EncodingVocabulary::fit(records);
    let mut samples = Vec::with_capacity(records.len());
    for record in records {
        samples.push(vocabulary.encode_context(&record.context())?);
    }
    let targets: Vec<f64> = records
        .iter()
        .map(|record| record.wait_time_minutes)
        .collect();

    let (train_rows, test_rows) = train_test_split(records.len(), config.test_fraction, config.seed)?;
    let train_samples: Vec<Vec<f64>> = train_rows.iter().map(|&i| samples[i].clone()).collect();
    let train_targets: Vec<f64> = train_rows.iter().map(|&i| targets[i]).collect();
    let test_samples: Vec<Vec<f64>> = test_rows.iter().map(|&i| samples[i].clone()).collect();
    let test_targets: Vec<f64> = test_rows.iter().map(|&i| targets[i]).collect();

    let forest = RandomForestRegressor::fit(&train_samples, &train_targets, config.forest)?;

    let train_predictions = predict_all(&forest, &train_samples)?;
    let test_predictions = predict_all(&forest, &test_samples)?;
    let metrics = ModelMetrics::from_splits(
        RegressionMetrics::compute(&train_targets, &train_predictions),
        RegressionMetrics::compute(&test_targets, &test_predictions),
    );
    info!(
        "Trained {} trees; test RMSE {:.2}, test R2 {:.3}",
        forest.n_trees(),
        metrics.test_rmse,
        metrics.test_r2
    );

    Ok(WaitTimeModel::new(forest, vocabulary, metrics))
}

fn predict_all(forest: &RandomForestRegressor, samples: &[Vec<f64>]) -> SchedulerResult<Vec<f64>> {
    samples.iter().map(|row| forest.predict(row)).collect()
}
