use shared::{DailyLog, LogCategory, UserProfile};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LogValidationError {
    #[error("{category} value {value} must be between {min} and {max}")]
    ValueOutOfRange {
        category: LogCategory,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{category} value must be a whole number")]
    ValueNotWhole { category: LogCategory },
    #[error("{category} value must be a multiple of 0.5")]
    ValueNotHalfStep { category: LogCategory },
    #[error("Body log needs a positive height or weight")]
    MissingBodyMeasure,
}

/// Fresh opaque identifier for a log entry
pub fn generate_log_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check that the value fits the scale of the log's category
pub fn validate_log(log: &DailyLog) -> Result<(), LogValidationError> {
    let category = log.category;
    let value = log.value;

    let (min, max, whole) = match category {
        LogCategory::Sleep | LogCategory::Stress | LogCategory::Exercise => (0.0, 10.0, false),
        LogCategory::Mood | LogCategory::Mental | LogCategory::Food => (1.0, 5.0, true),
        LogCategory::Body => {
            if log.body_height().is_none() && log.body_weight().is_none() {
                return Err(LogValidationError::MissingBodyMeasure);
            }
            return Ok(());
        }
    };

    if !value.is_finite() || value < min || value > max {
        return Err(LogValidationError::ValueOutOfRange { category, value, min, max });
    }
    if whole && value.fract() != 0.0 {
        return Err(LogValidationError::ValueNotWhole { category });
    }
    if (value * 2.0).fract() != 0.0 {
        return Err(LogValidationError::ValueNotHalfStep { category });
    }
    Ok(())
}

/// Profile with height and weight refreshed from a body log.
///
/// Missing or zero measures in the log keep the profile's current value.
pub fn apply_body_measures(profile: &UserProfile, log: &DailyLog) -> UserProfile {
    UserProfile {
        height: log.body_height().unwrap_or(profile.height),
        weight: log.body_weight().unwrap_or(profile.weight),
        ..profile.clone()
    }
}
