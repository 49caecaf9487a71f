use shared::UserProfile;

/// Longest display name accepted
pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileValidationError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Height must be a non-negative number of centimetres")]
    InvalidHeight,
    #[error("Weight must be a non-negative number of kilograms")]
    InvalidWeight,
}

/// Check the invariants a profile must hold before it is persisted
pub fn validate_profile(profile: &UserProfile) -> Result<(), ProfileValidationError> {
    let name = profile.name.trim();
    if name.is_empty() {
        return Err(ProfileValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ProfileValidationError::NameTooLong);
    }
    if !profile.height.is_finite() || profile.height < 0.0 {
        return Err(ProfileValidationError::InvalidHeight);
    }
    if !profile.weight.is_finite() || profile.weight < 0.0 {
        return Err(ProfileValidationError::InvalidWeight);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn profile(name: &str) -> UserProfile {
        UserProfile::new(name, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), false)
    }

    #[test]
    fn test_validate_profile() {
        assert_eq!(validate_profile(&profile("Ken")), Ok(()));
        assert_eq!(validate_profile(&profile("   ")), Err(ProfileValidationError::EmptyName));
        assert_eq!(
            validate_profile(&profile(&"x".repeat(101))),
            Err(ProfileValidationError::NameTooLong)
        );

        let mut p = profile("Ken");
        p.height = -1.0;
        assert_eq!(validate_profile(&p), Err(ProfileValidationError::InvalidHeight));

        let mut p = profile("Ken");
        p.weight = f64::NAN;
        assert_eq!(validate_profile(&p), Err(ProfileValidationError::InvalidWeight));
    }
}
