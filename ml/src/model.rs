// ml/src/model.rs

//! The trained wait-time model and its on-disk artifacts.
//!
//! Three files live under the artifact directory: the bincode-encoded forest
//! (`wait_time_model.bin`, prefixed with a schema version), the encoding
//! vocabulary (`encoders.json`) and the training metrics (`metrics.json`).
//! The JSON sidecars stay human-readable on purpose.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use models::{PatientContext, SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};

use crate::encoding::{EncodingVocabulary, FEATURE_COLUMNS};
use crate::forest::RandomForestRegressor;
use crate::metrics::{MetricsReport, ModelMetrics};

/// Bumped whenever the binary artifact layout changes.
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

pub const MODEL_FILE: &str = "wait_time_model.bin";
pub const ENCODERS_FILE: &str = "encoders.json";
pub const METRICS_FILE: &str = "metrics.json";

/// Binary artifact body, written after the schema-version header.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelPayload {
    model_type: String,
    trained_at: DateTime<Utc>,
    forest: RandomForestRegressor,
}

/// A fitted wait-time regressor bundled with everything needed to serve it.
#[derive(Debug, Clone)]
pub struct WaitTimeModel {
    forest: RandomForestRegressor,
    vocabulary: EncodingVocabulary,
    metrics: ModelMetrics,
    trained_at: DateTime<Utc>,
}

impl WaitTimeModel {
    pub(crate) fn new(
        forest: RandomForestRegressor,
        vocabulary: EncodingVocabulary,
        metrics: ModelMetrics,
    ) -> Self {
        Self {
            forest,
            vocabulary,
            metrics,
            trained_at: Utc::now(),
        }
    }

    /// Predicts the wait in minutes for one visit, rounded to two decimals.
    pub fn predict_wait_time(&self, context: &PatientContext) -> SchedulerResult<f64> {
        let row = self.vocabulary.encode_context(context)?;
        let minutes = self.forest.predict(&row)?;
        Ok((minutes * 100.0).round() / 100.0)
    }

    /// Predicts each context independently; one bad element does not poison
    /// the rest.
    pub fn predict_batch(&self, contexts: &[PatientContext]) -> Vec<SchedulerResult<f64>> {
        contexts
            .iter()
            .map(|context| self.predict_wait_time(context))
            .collect()
    }

    /// Feature importances paired with column names, highest first.
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = FEATURE_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .zip(self.forest.feature_importances())
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        pairs
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.metrics
    }

    pub fn vocabulary(&self) -> &EncodingVocabulary {
        &self.vocabulary
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn model_type(&self) -> &'static str {
        "RandomForestRegressor"
    }

    /// Writes all three artifact files, creating the directory if needed.
    pub fn save(&self, directory: &Path) -> SchedulerResult<()> {
        fs::create_dir_all(directory)?;

        let config = bincode::config::standard();
        let mut bytes = bincode::serde::encode_to_vec(ARTIFACT_SCHEMA_VERSION, config)?;
        let payload = ModelPayload {
            model_type: self.model_type().to_string(),
            trained_at: self.trained_at,
            forest: self.forest.clone(),
        };
        bytes.extend(bincode::serde::encode_to_vec(&payload, config)?);
        fs::write(directory.join(MODEL_FILE), bytes)?;

        fs::write(
            directory.join(ENCODERS_FILE),
            serde_json::to_string_pretty(&self.vocabulary)?,
        )?;
        let report = MetricsReport {
            wait_time: self.metrics,
        };
        fs::write(
            directory.join(METRICS_FILE),
            serde_json::to_string_pretty(&report)?,
        )?;

        info!("Saved model artifacts to {}", directory.display());
        Ok(())
    }

    /// Reads the artifact set back. The schema version is checked before the
    /// forest is decoded, so a future layout fails fast with a clear error.
    pub fn load(directory: &Path) -> SchedulerResult<Self> {
        let bytes = fs::read(directory.join(MODEL_FILE))?;
        let config = bincode::config::standard();

        let (schema_version, header_len): (u32, usize) =
            bincode::serde::decode_from_slice(&bytes, config)?;
        if schema_version != ARTIFACT_SCHEMA_VERSION {
            return Err(SchedulerError::SchemaMismatch {
                expected: ARTIFACT_SCHEMA_VERSION,
                found: schema_version,
            });
        }
        let (payload, _): (ModelPayload, usize) =
            bincode::serde::decode_from_slice(&bytes[header_len..], config)?;

        let encoders = fs::read_to_string(directory.join(ENCODERS_FILE))?;
        let vocabulary: EncodingVocabulary = serde_json::from_str(&encoders)
            .map_err(|e| SchedulerError::DeserializationError(format!("invalid encoder file: {}", e)))?;

        let metrics_raw = fs::read_to_string(directory.join(METRICS_FILE))?;
        let report: MetricsReport = serde_json::from_str(&metrics_raw)
            .map_err(|e| SchedulerError::DeserializationError(format!("invalid metrics file: {}", e)))?;

        info!("Loaded model artifacts from {}", directory.display());
        Ok(Self {
            forest: payload.forest,
            vocabulary,
            metrics: report.wait_time,
            trained_at: payload.trained_at,
        })
    }
}
