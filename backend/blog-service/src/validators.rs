use validator::ValidationError;

// Input validation helpers shared by the post and comment models

/// Reject strings that are empty or only whitespace
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// validator crate compatible custom validator for non-blank text
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}
