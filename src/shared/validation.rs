//! Validation Utilities

use std::collections::HashSet;
use std::hash::Hash;

use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));

    let message = field_errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation {
        message,
        errors: field_errors,
    }
}

/// Scan `items` in order and return the first value seen twice.
pub fn first_duplicate<T>(items: &[T]) -> Option<T>
where
    T: Eq + Hash + Copy,
{
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().copied().find(|item| !seen.insert(*item))
}
