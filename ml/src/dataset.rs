// ml/src/dataset.rs

//! Synthetic scheduling-history generation.
//!
//! The generator is seedable so training runs and tests are reproducible:
//! the same [`DatasetConfig`] always yields the same records.

use log::info;
use models::{ScheduleRecord, SchedulerError, SchedulerResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

/// Departments patients are admitted to, with their draw weights.
pub const DEPARTMENTS: [(&str, f64); 5] = [
    ("Emergency", 0.35),
    ("Cardiology", 0.20),
    ("Orthopedics", 0.15),
    ("Pediatrics", 0.15),
    ("General", 0.15),
];

/// Triage priorities, with their draw weights.
pub const PRIORITIES: [(&str, f64); 4] = [
    ("Critical", 0.10),
    ("High", 0.25),
    ("Medium", 0.40),
    ("Low", 0.25),
];

pub const DAYS_OF_WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const SEASONS: [&str; 4] = ["Winter", "Spring", "Summer", "Fall"];

/// Generator settings. The defaults mirror the dataset the bundled model was
/// tuned on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetConfig {
    pub num_records: usize,
    pub seed: u64,
    /// Standard deviation of the Gaussian noise added to each wait.
    pub noise_std_dev: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            num_records: 10_000,
            seed: 42,
            noise_std_dev: 5.0,
        }
    }
}

/// Generates a reproducible batch of labeled scheduling records.
pub fn generate_schedule_records(config: &DatasetConfig) -> SchedulerResult<Vec<ScheduleRecord>> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let department_dist = WeightedIndex::new(DEPARTMENTS.iter().map(|(_, w)| *w))
        .map_err(|e| SchedulerError::TrainingError(format!("invalid department weights: {}", e)))?;
    let priority_dist = WeightedIndex::new(PRIORITIES.iter().map(|(_, w)| *w))
        .map_err(|e| SchedulerError::TrainingError(format!("invalid priority weights: {}", e)))?;
    let noise = Normal::new(0.0, config.noise_std_dev)
        .map_err(|e| SchedulerError::TrainingError(format!("invalid noise deviation: {}", e)))?;

    let mut records = Vec::with_capacity(config.num_records);
    for i in 0..config.num_records {
        let day_of_week = DAYS_OF_WEEK[rng.gen_range(0..DAYS_OF_WEEK.len())];
        // The weekend flag always agrees with the drawn day.
        let is_weekend = u8::from(day_of_week == "Saturday" || day_of_week == "Sunday");

        let mut record = ScheduleRecord {
            patient_id: i as u64 + 1,
            arrival_hour: rng.gen_range(0..24),
            day_of_week: day_of_week.to_string(),
            department: DEPARTMENTS[department_dist.sample(&mut rng)].0.to_string(),
            priority: PRIORITIES[priority_dist.sample(&mut rng)].0.to_string(),
            num_available_doctors: rng.gen_range(1..10),
            num_available_nurses: rng.gen_range(2..15),
            num_available_rooms: rng.gen_range(1..20),
            current_queue_length: rng.gen_range(0..50),
            patient_age: rng.gen_range(1..95),
            is_weekend,
            season: SEASONS[rng.gen_range(0..SEASONS.len())].to_string(),
            wait_time_minutes: 0.0,
        };

        let wait = expected_wait(&record) + noise.sample(&mut rng);
        record.wait_time_minutes = wait.max(5.0);
        records.push(record);
    }

    info!("Generated {} synthetic schedule records", records.len());
    Ok(records)
}

/// Deterministic part of the wait-time formula, before noise. Waits never go
/// below five minutes.
fn expected_wait(record: &ScheduleRecord) -> f64 {
    let mut wait = 30.0;

    wait += match record.priority.as_str() {
        "Critical" => -20.0,
        "High" => -10.0,
        "Medium" => 0.0,
        _ => 15.0,
    };
    wait += match record.department.as_str() {
        "Emergency" => 10.0,
        "Cardiology" => 25.0,
        "Orthopedics" => 20.0,
        "Pediatrics" => 15.0,
        _ => 30.0,
    };

    wait -= 2.0 * record.num_available_doctors as f64;
    wait -= record.num_available_nurses as f64;
    wait -= 0.5 * record.num_available_rooms as f64;
    wait += 2.0 * record.current_queue_length as f64;

    wait += match record.arrival_hour {
        9..=17 => 20.0,
        18..=22 => 10.0,
        _ => 0.0,
    };
    if record.is_weekend == 1 {
        wait += 15.0;
    }

    wait.max(5.0)
}
