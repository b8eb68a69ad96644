use validator::ValidateEmail;

use crate::error::ApiError;

/// Trimmed, lower-cased email. Addresses are stored in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::Validation("Email cannot be empty".to_string()));
    }

    if email.len() > 254 || !email.validate_email() {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let length = password.chars().count();
    if length < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if length > 128 {
        return Err(ApiError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_number = password.chars().any(char::is_numeric);

    if !has_letter || !has_number {
        return Err(ApiError::Validation(
            "Password must contain at least one letter and one number".to_string(),
        ));
    }

    Ok(())
}

/// 2-100 characters, no control characters or markup.
pub fn validate_full_name(full_name: &str) -> Result<(), ApiError> {
    let length = full_name.chars().count();
    if !(2..=100).contains(&length) {
        return Err(ApiError::Validation(
            "Full name must be between 2 and 100 characters".to_string(),
        ));
    }

    if full_name
        .chars()
        .any(|c| c.is_control() || matches!(c, '<' | '>' | '{' | '}' | '"' | '`'))
    {
        return Err(ApiError::Validation(
            "Full name contains invalid characters".to_string(),
        ));
    }

    Ok(())
}
