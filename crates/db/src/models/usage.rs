//! Cached usage aggregate.

use serde::Serialize;
use sqlx::FromRow;

use hotspot_core::types::{DbId, Timestamp};

/// A row from the `user_usage` table. Best-effort; may be stale.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserUsage {
    pub user_id: DbId,
    pub total_hotspots: i64,
    pub total_pages: i64,
    pub last_updated: Timestamp,
}

/// Usage counted directly from `pages` and `hotspots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct UsageCounts {
    pub total_hotspots: i64,
    pub total_pages: i64,
}
