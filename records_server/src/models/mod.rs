//! School records data models and request bodies.

pub mod grade;
pub mod student;
pub mod subject;

use crate::error::{AppError, AppResult};

/// Trim `value` and check its length in characters against `min..=max`.
pub(crate) fn bounded_text(field: &str, value: &str, min: usize, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(AppError::invalid(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        )));
    }
    Ok(trimmed.to_string())
}
