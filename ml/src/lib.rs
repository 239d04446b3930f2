// ml/src/lib.rs

// Training and inference for the hospital wait-time model: synthetic data
// generation, label encoding, the regression forest itself, quality metrics,
// and versioned on-disk artifacts.

pub mod dataset;
pub mod encoding;
pub mod forest;
pub mod metrics;
pub mod model;
pub mod training;

pub use dataset::{generate_schedule_records, DatasetConfig};
pub use encoding::{EncodingVocabulary, CATEGORICAL_COLUMNS, FEATURE_COLUMNS};
pub use forest::{ForestConfig, RandomForestRegressor};
pub use metrics::{MetricsReport, ModelMetrics, RegressionMetrics};
pub use model::{WaitTimeModel, ARTIFACT_SCHEMA_VERSION};
pub use training::{train_wait_time_model, TrainingConfig};
