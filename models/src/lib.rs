// models/src/lib.rs

// Domain types shared by the training pipeline and the REST API.

pub mod errors;
pub mod patient;

pub use errors::{SchedulerError, SchedulerResult, ValidationError, ValidationResult};
pub use patient::{PatientContext, ScheduleRecord};
