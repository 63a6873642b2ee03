//! Edit-token capability checks.
//!
//! Possession of a page's edit token is the right to mutate it. Who holds
//! the token does not matter; signed-in identity is only ever consulted for
//! quota, never here.

use crate::error::CoreError;

/// Message returned for every denied mutation.
///
/// Shared by "page does not exist", "hotspot does not exist" and "wrong
/// token" so a caller guessing tokens learns nothing about which ids exist.
pub const DENIED_MESSAGE: &str = "Invalid edit token or page not found";

/// Message returned when no edit token was presented at all.
pub const MISSING_TOKEN_MESSAGE: &str = "Edit token required";

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Denied,
}

impl Authorization {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Convert into a `Result`, mapping `Denied` to the generic forbidden error.
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Self::Authorized => Ok(()),
            Self::Denied => Err(denied()),
        }
    }
}

/// The single error value every denial produces.
pub fn denied() -> CoreError {
    CoreError::Forbidden(DENIED_MESSAGE.to_string())
}

/// Check a presented token against the page's stored token.
///
/// `stored_token` is `None` when the target page (or the hotspot that would
/// lead to it) does not exist; that yields the same `Denied` as a mismatch.
pub fn authorize(stored_token: Option<&str>, presented_token: &str) -> Authorization {
    match stored_token {
        Some(stored) if tokens_match(stored, presented_token) => Authorization::Authorized,
        _ => Authorization::Denied,
    }
}

/// Exact byte equality whose running time does not depend on where the
/// first differing byte is.
///
/// Length is not secret (tokens have a fixed length), so a length mismatch
/// returns early.
pub fn tokens_match(stored: &str, presented: &str) -> bool {
    let a = stored.as_bytes();
    let b = presented.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
