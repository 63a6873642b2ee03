//! User profile model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hotspot_core::error::CoreError;
use hotspot_core::quota::PlanType;
use hotspot_core::types::{DbId, Timestamp};

/// A row from the `user_profiles` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub id: DbId,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub plan_type: String,
    pub subscription_status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserProfile {
    /// Parsed plan type. The column has a CHECK constraint, so a parse
    /// failure means the schema and code disagree.
    pub fn plan(&self) -> Result<PlanType, CoreError> {
        PlanType::parse(&self.plan_type)
    }
}

/// DTO for provisioning a profile (auth provider callback, tests).
#[derive(Debug, Deserialize)]
pub struct CreateUserProfile {
    pub email: String,
    pub full_name: Option<String>,
    pub plan_type: PlanType,
}
