//! The authoritative store as the editor sees it.

use async_trait::async_trait;

use hotspot_core::quota::QuotaReason;
use hotspot_core::types::DbId;

use crate::model::{
    CreatedPage, HotspotPatch, HotspotRecord, NewHotspot, PageRecord, PageSnapshot, UsageSummary,
};

/// Why the store refused or failed a request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// No credential was presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Wrong edit token, or the target does not exist.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Quota exceeded ({}): {used} of {limit} hotspots used", reason.as_str())]
    QuotaExceeded {
        reason: QuotaReason,
        used: i64,
        limit: i64,
    },

    /// The target vanished between authorization and the write.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Network failure, timeout, or a server-side error.
    #[error("Store unavailable: {0}")]
    Transient(String),
}

/// Operations the editor performs against the store.
///
/// Implemented over HTTP by [`crate::http::HttpStore`]; tests use in-memory
/// implementations.
#[async_trait]
pub trait HotspotStore: Send + Sync {
    /// Public view of a page plus its hotspots in stacking order.
    async fn load_page(&self, slug: &str) -> Result<PageSnapshot, StoreError>;

    /// Create an empty page. Only call site that ever sees an edit token
    /// come back from the store.
    async fn create_page(&self, title: Option<&str>) -> Result<CreatedPage, StoreError>;

    async fn rename_page(
        &self,
        edit_token: &str,
        slug: &str,
        title: Option<&str>,
    ) -> Result<PageRecord, StoreError>;

    async fn create_hotspot(
        &self,
        edit_token: &str,
        input: &NewHotspot,
    ) -> Result<HotspotRecord, StoreError>;

    async fn update_hotspot(
        &self,
        edit_token: &str,
        id: DbId,
        patch: &HotspotPatch,
    ) -> Result<HotspotRecord, StoreError>;

    async fn delete_hotspot(&self, edit_token: &str, id: DbId) -> Result<(), StoreError>;

    /// Usage of the signed-in user this store acts for.
    async fn fetch_usage(&self) -> Result<UsageSummary, StoreError>;
}
