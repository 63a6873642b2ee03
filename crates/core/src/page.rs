//! Page slug / edit-token generation and title rules.
//!
//! The slug is the public lookup key; the edit token is the capability
//! credential. Both are generated exactly once, when the page is created.

use rand::Rng;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated slug.
pub const SLUG_LENGTH: usize = 10;

/// Length of a generated edit token (alphanumeric characters).
pub const EDIT_TOKEN_LENGTH: usize = 32;

/// Maximum page title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a short, URL-safe, lowercase slug.
///
/// Uniqueness is enforced by the store's unique constraint; callers retry on
/// a collision.
pub fn generate_slug() -> String {
    let mut rng = rand::rng();
    (0..SLUG_LENGTH)
        .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

/// Generate a high-entropy edit token from the thread-local CSPRNG.
pub fn generate_edit_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(EDIT_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Normalize a submitted title: trimmed, empty becomes `None`.
pub fn normalize_title(title: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(trimmed) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let len = trimmed.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "title is {len} characters, maximum is {MAX_TITLE_LENGTH}"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Check a slug taken from a URL before it reaches the database.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= 64
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !well_formed {
        return Err(CoreError::Validation(format!("Invalid slug '{slug}'")));
    }
    Ok(())
}
