//! Hotspot tooltip text rules.

use validator::ValidationError;

use crate::error::CoreError;

/// Maximum tooltip length, in characters.
pub const MAX_TEXT_LENGTH: usize = 1000;

/// Stacking order given to new hotspots.
pub const DEFAULT_Z_INDEX: i32 = 0;

/// Trim tooltip text and check it is non-empty and within bounds.
///
/// Returns the trimmed text, which is what gets persisted.
pub fn normalize_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "text must not be empty".to_string(),
        ));
    }
    let len = trimmed.chars().count();
    if len > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "text is {len} characters, maximum is {MAX_TEXT_LENGTH}"
        )));
    }
    Ok(trimmed.to_string())
}

/// `validator` hook for DTO fields carrying tooltip text.
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    normalize_text(text).map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("text");
        err.message = Some(e.to_string().into());
        err
    })
}
