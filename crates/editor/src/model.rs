//! Wire types exchanged with the store, and the editor's local hotspot.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use hotspot_core::coords::Fraction;
use hotspot_core::quota::PlanType;
use hotspot_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Store records
// ---------------------------------------------------------------------------

/// A hotspot as the store returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotRecord {
    pub id: DbId,
    pub page_id: DbId,
    pub x_pct: f64,
    pub y_pct: f64,
    pub text: String,
    pub z_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public page metadata. Never carries the edit token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: DbId,
    pub slug: String,
    pub title: Option<String>,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub image_width: Option<i32>,
    pub image_height: Option<i32>,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Everything the editor needs to (re)build its local state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub page: PageRecord,
    /// In stacking order, lowest first.
    pub hotspots: Vec<HotspotRecord>,
}

/// Returned once, when a page is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPage {
    pub id: DbId,
    pub slug: String,
    pub edit_token: String,
}

/// The signed-in user's usage as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub plan: PlanType,
    pub total_hotspots: i64,
    pub total_pages: i64,
    pub limit: Option<i64>,
    pub remaining: Option<i64>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHotspot {
    pub page_id: DbId,
    pub x_pct: f64,
    pub y_pct: f64,
    pub text: String,
}

/// Partial update. `None` fields are left unchanged by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotspotPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl HotspotPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn position(fraction: Fraction) -> Self {
        Self {
            x_pct: Some(fraction.x),
            y_pct: Some(fraction.y),
            ..Default::default()
        }
    }

    pub fn z_index(z_index: i32) -> Self {
        Self {
            z_index: Some(z_index),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.x_pct.is_none() && self.y_pct.is_none() && self.z_index.is_none()
    }

    /// Drop every field whose value `current` already has.
    pub fn without_unchanged(mut self, current: &LocalHotspot) -> Self {
        if self.text.as_deref() == Some(current.text.as_str()) {
            self.text = None;
        }
        if self.x_pct == Some(current.x_pct) {
            self.x_pct = None;
        }
        if self.y_pct == Some(current.y_pct) {
            self.y_pct = None;
        }
        if self.z_index == Some(current.z_index) {
            self.z_index = None;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Local state
// ---------------------------------------------------------------------------

/// Identity of a hotspot in the editor.
///
/// A provisional key is local to one editor and never sent to the store; a
/// stored key is the store's id. The two never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotspotKey {
    Provisional(u64),
    Stored(DbId),
}

impl HotspotKey {
    pub fn stored_id(&self) -> Option<DbId> {
        match self {
            Self::Stored(id) => Some(*id),
            Self::Provisional(_) => None,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, Self::Provisional(_))
    }
}

impl fmt::Display for HotspotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisional(n) => write!(f, "temp-{n}"),
            Self::Stored(id) => write!(f, "{id}"),
        }
    }
}

/// Lifecycle of one optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    /// Applied locally, awaiting the store.
    Pending,
    /// The store accepted it; local state holds the store's record.
    Confirmed,
    /// The store refused it; local state was restored or reloaded.
    RolledBack,
}

/// A hotspot as the editor holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalHotspot {
    pub key: HotspotKey,
    pub page_id: DbId,
    pub x_pct: f64,
    pub y_pct: f64,
    pub text: String,
    pub z_index: i32,
    pub updated_at: Timestamp,
    /// `Pending` while a create or update for this hotspot is in flight.
    pub state: MutationState,
}

impl LocalHotspot {
    /// A provisional record standing in for a create that has not returned.
    pub fn provisional(temp_id: u64, page_id: DbId, fraction: Fraction, text: String) -> Self {
        Self {
            key: HotspotKey::Provisional(temp_id),
            page_id,
            x_pct: fraction.x,
            y_pct: fraction.y,
            text,
            z_index: hotspot_core::hotspot::DEFAULT_Z_INDEX,
            updated_at: Utc::now(),
            state: MutationState::Pending,
        }
    }

    pub fn fraction(&self) -> Fraction {
        Fraction {
            x: self.x_pct,
            y: self.y_pct,
        }
    }

    /// Apply a patch locally and stamp a fresh update time.
    pub fn apply(&mut self, patch: &HotspotPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(x) = patch.x_pct {
            self.x_pct = x;
        }
        if let Some(y) = patch.y_pct {
            self.y_pct = y;
        }
        if let Some(z) = patch.z_index {
            self.z_index = z;
        }
        self.updated_at = Utc::now();
    }
}

impl From<HotspotRecord> for LocalHotspot {
    fn from(record: HotspotRecord) -> Self {
        Self {
            key: HotspotKey::Stored(record.id),
            page_id: record.page_id,
            x_pct: record.x_pct,
            y_pct: record.y_pct,
            text: record.text,
            z_index: record.z_index,
            updated_at: record.updated_at,
            state: MutationState::Confirmed,
        }
    }
}
