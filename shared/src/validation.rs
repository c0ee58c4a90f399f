//! Input validation for goal creation

use thiserror::Error;

/// Longest goal name accepted
pub const MAX_GOAL_NAME_LEN: usize = 100;

/// Upper bound for any goal target, across all habit types
pub const MAX_GOAL_TARGET: f64 = 1_000_000.0;

/// Validate a goal's display name
pub fn validate_goal_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("name", "cannot be empty"));
    }
    if trimmed.chars().count() > MAX_GOAL_NAME_LEN {
        return Err(ValidationError::new("name", "must be at most 100 characters"));
    }
    Ok(())
}

/// Validate a goal's numeric target
pub fn validate_goal_target(target: f64) -> Result<(), ValidationError> {
    if target.is_nan() || target.is_infinite() {
        return Err(ValidationError::new("target", "must be a valid number"));
    }
    if target <= 0.0 {
        return Err(ValidationError::new("target", "must be greater than zero"));
    }
    if target > MAX_GOAL_TARGET {
        return Err(ValidationError::new("target", "is unreasonably high"));
    }
    Ok(())
}

/// Get user-friendly display label for a field name
pub fn get_field_display_label(field: &str) -> &str {
    match field {
        "name" => "Goal Name",
        "target" => "Target",
        "habit_type" => "Habit Type",
        "period" => "Period",
        _ => field,
    }
}

/// Validation error with field context
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{display_label}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
