use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Json<T>` whose rejections (bad syntax, wrong shape, missing content type)
/// surface as 400 validation errors in the usual error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::Validation(rejection_message(&rejection))),
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`".to_string()
        }
        other => other.body_text(),
    }
}

pub const EDUCATION_LEVELS: &[&str] = &[
    "secondary",
    "higher_secondary",
    "undergraduate",
    "postgraduate",
    "working_professional",
];

pub fn validate_education_level(level: &str) -> Result<(), ApiError> {
    if EDUCATION_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Invalid education level: '{level}'. Must be one of: {}",
            EDUCATION_LEVELS.join(", ")
        )))
    }
}

/// Trimmed text of `min..=max` characters.
pub fn validate_text(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let length = value.trim().chars().count();
    if length < min || length > max {
        return Err(ApiError::Validation(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

/// Trim each entry, drop case-insensitive duplicates (keeping the first
/// spelling and the original order), then enforce count and length limits.
pub fn normalize_tags(
    field: &str,
    tags: &[String],
    min_count: usize,
    max_count: usize,
    max_len: usize,
) -> Result<Vec<String>, ApiError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(ApiError::Validation(format!("{field} cannot contain empty entries")));
        }
        if tag.chars().count() > max_len {
            return Err(ApiError::Validation(format!(
                "Each {field} entry must be at most {max_len} characters"
            )));
        }
        let lower = tag.to_lowercase();
        if !normalized.iter().any(|existing| existing.to_lowercase() == lower) {
            normalized.push(tag.to_string());
        }
    }

    if normalized.len() < min_count || normalized.len() > max_count {
        return Err(ApiError::Validation(format!(
            "{field} must have between {min_count} and {max_count} entries"
        )));
    }

    Ok(normalized)
}

/// Optional leading `+`, then 7-15 digits. Spaces and dashes are ignored.
/// Returns the compact form that gets stored.
pub fn normalize_phone(phone: &str) -> Result<String, ApiError> {
    let compact: String = phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);

    if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "Phone number must be 7 to 15 digits, optionally starting with +".to_string(),
        ));
    }

    Ok(compact)
}

pub fn validate_date_of_birth(date_of_birth: NaiveDate, today: NaiveDate) -> Result<(), ApiError> {
    if date_of_birth > today {
        return Err(ApiError::Validation(
            "Date of birth cannot be in the future".to_string(),
        ));
    }
    Ok(())
}

/// Three-letter ISO 4217 code, returned upper-cased.
pub fn normalize_currency(currency: &str) -> Result<String, ApiError> {
    let currency = currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::Validation(
            "Currency must be a three-letter ISO code".to_string(),
        ));
    }
    Ok(currency.to_ascii_uppercase())
}

/// Lower-case letters, digits and single hyphens, 3-64 characters.
pub fn validate_slug(slug: &str) -> Result<(), ApiError> {
    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !(3..=64).contains(&slug.len())
        || !valid_chars
        || slug.starts_with('-')
        || slug.ends_with('-')
        || slug.contains("--")
    {
        return Err(ApiError::Validation(
            "Slug must be 3-64 lowercase letters, digits or single hyphens".to_string(),
        ));
    }
    Ok(())
}

/// Empty or whitespace-only optional text becomes `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
