#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use hotspot_core::quota::{PlanType, QuotaReason};
use hotspot_core::types::DbId;
use hotspot_editor::model::{
    CreatedPage, HotspotPatch, HotspotRecord, NewHotspot, PageRecord, PageSnapshot, UsageSummary,
};
use hotspot_editor::store::{HotspotStore, StoreError};

pub const SLUG: &str = "testslug01";
pub const TOKEN: &str = "correct-edit-token";
pub const PAGE_ID: DbId = 1;

/// Which store call an injected failure or pause applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Load,
    CreatePage,
    Rename,
    Create,
    Update,
    Delete,
    Usage,
}

struct Data {
    page: PageRecord,
    hotspots: Vec<HotspotRecord>,
    next_id: DbId,
    /// Store-side cap per page; `None` for unlimited.
    limit: Option<i64>,
    usage_plan: PlanType,
    failures: Vec<(Call, StoreError)>,
    calls: Vec<Call>,
}

/// In-memory store. Clones share data, so a test can keep one clone for
/// inspection after handing another to the editor.
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
    /// When set, the paused call waits on this before completing.
    gate: Arc<Mutex<Option<(Call, Arc<Notify>)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            data: Arc::new(Mutex::new(Data {
                page: PageRecord {
                    id: PAGE_ID,
                    slug: SLUG.to_string(),
                    title: None,
                    image_path: None,
                    image_url: None,
                    image_width: None,
                    image_height: None,
                    owner_id: None,
                    created_at: now,
                    updated_at: now,
                },
                hotspots: Vec::new(),
                next_id: 100,
                limit: None,
                usage_plan: PlanType::Free,
                failures: Vec::new(),
                calls: Vec::new(),
            })),
            gate: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_limit(self, limit: i64) -> Self {
        self.data.lock().unwrap().limit = Some(limit);
        self
    }

    /// Seed a stored hotspot and return its id.
    pub fn seed(&self, x: f64, y: f64, text: &str) -> DbId {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id;
        data.next_id += 1;
        let now = Utc::now();
        data.hotspots.push(HotspotRecord {
            id,
            page_id: PAGE_ID,
            x_pct: x,
            y_pct: y,
            text: text.to_string(),
            z_index: 0,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Change a hotspot behind the editor's back.
    pub fn set_text(&self, id: DbId, text: &str) {
        let mut data = self.data.lock().unwrap();
        if let Some(h) = data.hotspots.iter_mut().find(|h| h.id == id) {
            h.text = text.to_string();
        }
    }

    /// Make the next `call` fail with `err`.
    pub fn fail_next(&self, call: Call, err: StoreError) {
        self.data.lock().unwrap().failures.push((call, err));
    }

    /// Make the next `call` wait until the returned handle is notified.
    pub fn pause(&self, call: Call) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((call, Arc::clone(&notify)));
        notify
    }

    pub fn hotspots(&self) -> Vec<HotspotRecord> {
        self.data.lock().unwrap().hotspots.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.data.lock().unwrap().page.title.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.data.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().into_iter().filter(|c| *c == call).count()
    }

    /// Record the call, honour any pause, then pop an injected failure.
    async fn enter(&self, call: Call) -> Result<(), StoreError> {
        self.data.lock().unwrap().calls.push(call);

        let gate = {
            let mut gate = self.gate.lock().unwrap();
            match gate.as_ref() {
                Some((paused, _)) if *paused == call => gate.take().map(|(_, n)| n),
                _ => None,
            }
        };
        if let Some(notify) = gate {
            notify.notified().await;
        }

        let mut data = self.data.lock().unwrap();
        match data.failures.iter().position(|(c, _)| *c == call) {
            Some(idx) => Err(data.failures.remove(idx).1),
            None => Ok(()),
        }
    }

    fn check_token(token: &str) -> Result<(), StoreError> {
        if token == TOKEN {
            Ok(())
        } else {
            Err(StoreError::Forbidden(
                "Invalid edit token or page not found".into(),
            ))
        }
    }
}

#[async_trait]
impl HotspotStore for MemoryStore {
    async fn load_page(&self, slug: &str) -> Result<PageSnapshot, StoreError> {
        self.enter(Call::Load).await?;
        let data = self.data.lock().unwrap();
        if slug != data.page.slug {
            return Err(StoreError::NotFound("Page not found".into()));
        }
        let mut hotspots = data.hotspots.clone();
        hotspots.sort_by_key(|h| h.z_index);
        Ok(PageSnapshot {
            page: data.page.clone(),
            hotspots,
        })
    }

    async fn create_page(&self, title: Option<&str>) -> Result<CreatedPage, StoreError> {
        self.enter(Call::CreatePage).await?;
        let mut data = self.data.lock().unwrap();
        data.page.title = title.map(str::to_string);
        Ok(CreatedPage {
            id: data.page.id,
            slug: data.page.slug.clone(),
            edit_token: TOKEN.to_string(),
        })
    }

    async fn rename_page(
        &self,
        edit_token: &str,
        _slug: &str,
        title: Option<&str>,
    ) -> Result<PageRecord, StoreError> {
        self.enter(Call::Rename).await?;
        Self::check_token(edit_token)?;
        let mut data = self.data.lock().unwrap();
        data.page.title = title.map(str::to_string);
        data.page.updated_at = Utc::now();
        Ok(data.page.clone())
    }

    async fn create_hotspot(
        &self,
        edit_token: &str,
        input: &NewHotspot,
    ) -> Result<HotspotRecord, StoreError> {
        self.enter(Call::Create).await?;
        Self::check_token(edit_token)?;
        let mut data = self.data.lock().unwrap();
        let used = data.hotspots.len() as i64;
        if let Some(limit) = data.limit {
            if used >= limit {
                return Err(StoreError::QuotaExceeded {
                    reason: QuotaReason::AnonymousLimit,
                    used,
                    limit,
                });
            }
        }
        let id = data.next_id;
        data.next_id += 1;
        let now = Utc::now();
        let record = HotspotRecord {
            id,
            page_id: input.page_id,
            x_pct: input.x_pct,
            y_pct: input.y_pct,
            text: input.text.clone(),
            z_index: 0,
            created_at: now,
            updated_at: now,
        };
        data.hotspots.push(record.clone());
        Ok(record)
    }

    async fn update_hotspot(
        &self,
        edit_token: &str,
        id: DbId,
        patch: &HotspotPatch,
    ) -> Result<HotspotRecord, StoreError> {
        self.enter(Call::Update).await?;
        Self::check_token(edit_token)?;
        let mut data = self.data.lock().unwrap();
        let hotspot = data
            .hotspots
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| StoreError::Forbidden("Invalid edit token or page not found".into()))?;
        if let Some(text) = &patch.text {
            hotspot.text = text.clone();
        }
        if let Some(x) = patch.x_pct {
            hotspot.x_pct = x;
        }
        if let Some(y) = patch.y_pct {
            hotspot.y_pct = y;
        }
        if let Some(z) = patch.z_index {
            hotspot.z_index = z;
        }
        hotspot.updated_at = Utc::now();
        Ok(hotspot.clone())
    }

    async fn delete_hotspot(&self, edit_token: &str, id: DbId) -> Result<(), StoreError> {
        self.enter(Call::Delete).await?;
        Self::check_token(edit_token)?;
        let mut data = self.data.lock().unwrap();
        let before = data.hotspots.len();
        data.hotspots.retain(|h| h.id != id);
        if data.hotspots.len() == before {
            return Err(StoreError::NotFound("Hotspot not found".into()));
        }
        Ok(())
    }

    async fn fetch_usage(&self) -> Result<UsageSummary, StoreError> {
        self.enter(Call::Usage).await?;
        let data = self.data.lock().unwrap();
        let total = data.hotspots.len() as i64;
        Ok(UsageSummary {
            plan: data.usage_plan,
            total_hotspots: total,
            total_pages: 1,
            limit: Some(10),
            remaining: Some((10 - total).max(0)),
        })
    }
}
