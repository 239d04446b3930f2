// ml/src/encoding.rs

//! Label encoding for the categorical feature columns.
//!
//! Each categorical column gets a lexicographically sorted class list; a
//! category's code is its position in that list. Sorting makes codes stable
//! across runs for the same observed value set, so a persisted model keeps
//! agreeing with its persisted vocabulary.

use std::collections::BTreeMap;

use models::{PatientContext, ScheduleRecord, SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};

/// Model feature columns, in the exact order the forest consumes them.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "arrival_hour",
    "day_of_week",
    "department",
    "priority",
    "num_available_doctors",
    "num_available_nurses",
    "num_available_rooms",
    "current_queue_length",
    "patient_age",
    "is_weekend",
    "season",
];

/// Columns that carry category labels rather than numbers.
pub const CATEGORICAL_COLUMNS: [&str; 4] = ["day_of_week", "department", "priority", "season"];

/// Sorted class lists per categorical column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingVocabulary {
    columns: BTreeMap<String, Vec<String>>,
}

impl EncodingVocabulary {
    /// Builds the vocabulary from training rows: one sorted, deduplicated
    /// class list per categorical column.
    pub fn fit(records: &[ScheduleRecord]) -> Self {
        let mut columns = BTreeMap::new();
        for column in CATEGORICAL_COLUMNS {
            let mut classes: Vec<String> = records
                .iter()
                .filter_map(|record| categorical_value(record, column))
                .map(str::to_string)
                .collect();
            classes.sort();
            classes.dedup();
            columns.insert(column.to_string(), classes);
        }
        Self { columns }
    }

    /// Looks up the code for `value` in `column`.
    pub fn encode(&self, column: &str, value: &str) -> SchedulerResult<usize> {
        let classes = self.columns.get(column).ok_or_else(|| {
            SchedulerError::PredictionError(format!("no vocabulary for column '{}'", column))
        })?;
        classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .map_err(|_| SchedulerError::UnknownCategory {
                field: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Sorted classes for one column; empty when the column is unknown.
    pub fn classes(&self, column: &str) -> &[String] {
        self.columns
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Encodes a visit context into the fixed [`FEATURE_COLUMNS`] order.
    pub fn encode_context(&self, context: &PatientContext) -> SchedulerResult<Vec<f64>> {
        Ok(vec![
            context.arrival_hour as f64,
            self.encode("day_of_week", &context.day_of_week)? as f64,
            self.encode("department", &context.department)? as f64,
            self.encode("priority", &context.priority)? as f64,
            context.num_available_doctors as f64,
            context.num_available_nurses as f64,
            context.num_available_rooms as f64,
            context.current_queue_length as f64,
            context.patient_age as f64,
            context.is_weekend as f64,
            self.encode("season", &context.season)? as f64,
        ])
    }
}

fn categorical_value<'a>(record: &'a ScheduleRecord, column: &str) -> Option<&'a str> {
    match column {
        "day_of_week" => Some(&record.day_of_week),
        "department" => Some(&record.department),
        "priority" => Some(&record.priority),
        "season" => Some(&record.season),
        _ => None,
    }
}
