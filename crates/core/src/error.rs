use crate::quota::QuotaReason;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Quota exceeded ({}): {used} of {limit} hotspots used", reason.as_str())]
    QuotaExceeded {
        reason: QuotaReason,
        used: i64,
        limit: i64,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
