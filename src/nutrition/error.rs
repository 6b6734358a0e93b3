//! Calculator error types

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the nutrition calculator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    /// A profile field is outside its valid domain
    #[error("Invalid profile field '{field}': {value}")]
    InvalidProfile { field: &'static str, value: String },

    /// A day range whose end precedes its start
    #[error("Invalid range: end day {end} is before start day {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl NutritionError {
    pub(crate) fn invalid_profile(field: &'static str, value: impl ToString) -> Self {
        NutritionError::InvalidProfile {
            field,
            value: value.to_string(),
        }
    }
}

/// Result type for calculator operations
pub type NutritionResult<T> = Result<T, NutritionError>;
