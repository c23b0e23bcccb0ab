//! Frame and payload validation.

use validator::{Validate, ValidationErrors};

use rentchat_core::error::AppError;
use rentchat_core::result::AppResult;

/// Check an inbound text frame before parsing it.
pub fn validate_frame(raw: &str, max_bytes: usize) -> AppResult<()> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Run the derived field rules of an intent payload.
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(into_app_error)
}

/// The error reported when a required field is absent.
pub fn missing_fields() -> AppError {
    AppError::validation("Missing required fields")
}

fn into_app_error(errors: ValidationErrors) -> AppError {
    let missing = errors
        .field_errors()
        .values()
        .flat_map(|list| list.iter())
        .any(|e| e.code == "required");
    if missing {
        missing_fields()
    } else {
        AppError::validation(format!("Invalid payload: {errors}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::MarkAsReadPayload;

    #[test]
    fn test_oversize_frame_rejected() {
        let raw = "x".repeat(33);
        assert!(validate_frame(&raw, 32).is_err());
        assert!(validate_frame(&raw, 64).is_ok());
    }

    #[test]
    fn test_blank_frame_rejected() {
        let err = validate_frame("  \n", 64).expect_err("blank");
        assert_eq!(err.message, "Empty message");
    }

    #[test]
    fn test_required_maps_to_missing_fields() {
        let err = validate_payload(&MarkAsReadPayload::default()).expect_err("missing");
        assert_eq!(err.message, "Missing required fields");
    }
}
