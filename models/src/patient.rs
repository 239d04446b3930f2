// models/src/patient.rs

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// A patient visit awaiting a wait-time estimate.
///
/// One of these mirrors a row of the scheduling dataset minus the target
/// column. The bounds checked by [`PatientContext::validate`] match the ranges
/// the bundled generator produces; categorical values are checked later
/// against the trained vocabulary rather than here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientContext {
    /// Hour of arrival, 0-23.
    pub arrival_hour: u8,
    pub day_of_week: String,
    pub department: String,
    pub priority: String,
    pub num_available_doctors: u32,
    pub num_available_nurses: u32,
    pub num_available_rooms: u32,
    pub current_queue_length: u32,
    /// Age in years, 0-120.
    pub patient_age: u8,
    /// 1 when the visit falls on a weekend, 0 otherwise.
    pub is_weekend: u8,
    pub season: String,
}

impl PatientContext {
    /// Checks every field and returns the full list of violations, so a
    /// client sees everything wrong with a request at once.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut violations = Vec::new();

        if self.arrival_hour > 23 {
            violations.push(ValidationError::OutOfRange {
                field: "arrival_hour",
                min: 0,
                max: 23,
                value: self.arrival_hour as i64,
            });
        }
        if self.patient_age > 120 {
            violations.push(ValidationError::OutOfRange {
                field: "patient_age",
                min: 0,
                max: 120,
                value: self.patient_age as i64,
            });
        }
        if self.is_weekend > 1 {
            violations.push(ValidationError::OutOfRange {
                field: "is_weekend",
                min: 0,
                max: 1,
                value: self.is_weekend as i64,
            });
        }

        let categorical = [
            ("day_of_week", &self.day_of_week),
            ("department", &self.department),
            ("priority", &self.priority),
            ("season", &self.season),
        ];
        for (field, value) in categorical {
            if value.trim().is_empty() {
                violations.push(ValidationError::EmptyCategory { field });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// One labeled row of scheduling history: a visit context plus the observed
/// wait in minutes. Produced by the synthetic generator and accepted as
/// training input from callers who bring their own history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub patient_id: u64,
    pub arrival_hour: u8,
    pub day_of_week: String,
    pub department: String,
    pub priority: String,
    pub num_available_doctors: u32,
    pub num_available_nurses: u32,
    pub num_available_rooms: u32,
    pub current_queue_length: u32,
    pub patient_age: u8,
    pub is_weekend: u8,
    pub season: String,
    /// Observed wait in minutes, the training target.
    pub wait_time_minutes: f64,
}

impl ScheduleRecord {
    /// The visit context without the target column.
    pub fn context(&self) -> PatientContext {
        PatientContext {
            arrival_hour: self.arrival_hour,
            day_of_week: self.day_of_week.clone(),
            department: self.department.clone(),
            priority: self.priority.clone(),
            num_available_doctors: self.num_available_doctors,
            num_available_nurses: self.num_available_nurses,
            num_available_rooms: self.num_available_rooms,
            current_queue_length: self.current_queue_length,
            patient_age: self.patient_age,
            is_weekend: self.is_weekend,
            season: self.season.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PatientContext, ScheduleRecord};
    use crate::errors::ValidationError;

    fn valid_context() -> PatientContext {
        PatientContext {
            arrival_hour: 14,
            day_of_week: "Monday".to_string(),
            department: "Emergency".to_string(),
            priority: "High".to_string(),
            num_available_doctors: 3,
            num_available_nurses: 5,
            num_available_rooms: 4,
            current_queue_length: 12,
            patient_age: 45,
            is_weekend: 0,
            season: "Winter".to_string(),
        }
    }

    #[test]
    fn should_accept_valid_context() {
        assert!(valid_context().validate().is_ok());
    }

    #[test]
    fn should_reject_arrival_hour_out_of_range() {
        let mut context = valid_context();
        context.arrival_hour = 25;
        let violations = context.validate().unwrap_err();
        assert_eq!(
            violations,
            vec![ValidationError::OutOfRange {
                field: "arrival_hour",
                min: 0,
                max: 23,
                value: 25,
            }]
        );
    }

    #[test]
    fn should_reject_blank_category() {
        let mut context = valid_context();
        context.department = "   ".to_string();
        let violations = context.validate().unwrap_err();
        assert_eq!(
            violations,
            vec![ValidationError::EmptyCategory {
                field: "department"
            }]
        );
    }

    #[test]
    fn should_collect_every_violation_at_once() {
        let mut context = valid_context();
        context.arrival_hour = 99;
        context.patient_age = 130;
        context.is_weekend = 2;
        context.season = String::new();
        let violations = context.validate().unwrap_err();
        assert_eq!(violations.len(), 4);
    }

    #[test]
    fn should_reject_unknown_fields_when_deserializing() {
        let raw = r#"{
            "arrival_hour": 10,
            "day_of_week": "Monday",
            "department": "General",
            "priority": "Low",
            "num_available_doctors": 2,
            "num_available_nurses": 4,
            "num_available_rooms": 3,
            "current_queue_length": 7,
            "patient_age": 30,
            "is_weekend": 0,
            "season": "Fall",
            "favorite_color": "blue"
        }"#;
        assert!(serde_json::from_str::<PatientContext>(raw).is_err());
    }

    #[test]
    fn should_extract_context_from_record() {
        let record = ScheduleRecord {
            patient_id: 1001,
            arrival_hour: 9,
            day_of_week: "Saturday".to_string(),
            department: "Pediatrics".to_string(),
            priority: "Medium".to_string(),
            num_available_doctors: 2,
            num_available_nurses: 6,
            num_available_rooms: 5,
            current_queue_length: 3,
            patient_age: 8,
            is_weekend: 1,
            season: "Summer".to_string(),
            wait_time_minutes: 42.5,
        };
        let context = record.context();
        assert_eq!(context.arrival_hour, 9);
        assert_eq!(context.department, "Pediatrics");
        assert_eq!(context.is_weekend, 1);
    }
}
