//! Input validation helpers
//!
//! Request DTOs derive `validator::Validate`; handlers call [`validate`] before
//! touching storage so validation failures never have side effects.

use validator::Validate;

use crate::utils::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: menu item, category, add-on, staff full name
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, cancellation details
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, transaction id
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Run derive-based validation, mapping failures to a field-level error list
pub fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(|e| AppError::from_validation(&e))
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Tibs", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_SHORT_TEXT_LEN + 1);
        let err = validate_required_text(&long, "phone", MAX_SHORT_TEXT_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "url", MAX_URL_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(MAX_NOTE_LEN + 1)), "details", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_validate_lists_fields() {
        let req = shared::models::LoginRequest {
            username: String::new(),
            pin: "12".to_string(),
        };
        let err = validate(&req).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(err.details.unwrap().contains_key("errors"));
    }
}
