//! Hotspot model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use hotspot_core::types::{DbId, Timestamp};

/// A row from the `hotspots` table.
///
/// `x_pct` / `y_pct` are fractions of the image's width / height in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Hotspot {
    pub id: DbId,
    pub page_id: DbId,
    pub x_pct: f64,
    pub y_pct: f64,
    pub text: String,
    pub z_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a hotspot.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHotspot {
    pub page_id: DbId,
    #[validate(range(min = 0.0, max = 1.0))]
    pub x_pct: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub y_pct: f64,
    #[validate(custom(function = "hotspot_core::hotspot::validate_text"))]
    pub text: String,
}

/// DTO for updating a hotspot. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateHotspot {
    #[validate(custom(function = "hotspot_core::hotspot::validate_text"))]
    pub text: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub x_pct: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub y_pct: Option<f64>,
    pub z_index: Option<i32>,
}
