//! Optimistic editing of one page's hotspots.
//!
//! Every mutation is applied to local state first and reconciled with the
//! store afterwards:
//!
//! - **create** inserts a provisional record under a local-only key, then
//!   swaps it for the store's record, or removes it if the store refuses.
//! - **update** patches the local record, then replaces it with the store's
//!   record. On failure local state is thrown away and the page reloaded.
//! - **delete** removes the local record. On failure the page is reloaded;
//!   the removed copy is never put back.
//!
//! The state lock is never held across a store call, so the UI can keep
//! reading while requests are out.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use hotspot_core::coords::{validate_fraction, Fraction};
use hotspot_core::error::CoreError;
use hotspot_core::hotspot::normalize_text;
use hotspot_core::page::normalize_title;
use hotspot_core::quota::QuotaReason;
use hotspot_core::types::DbId;

use crate::links::ShareLinks;
use crate::model::{
    CreatedPage, HotspotKey, HotspotPatch, LocalHotspot, MutationState, NewHotspot, PageRecord,
    PageSnapshot,
};
use crate::notice::Notice;
use crate::session::Session;
use crate::store::{HotspotStore, StoreError};

/// Local refusals and store failures of an editor operation.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// An update or delete for this hotspot has not returned yet.
    #[error("Hotspot {0} already has a change in flight")]
    MutationInFlight(DbId),

    #[error("Hotspot {0} is not on this page")]
    UnknownHotspot(DbId),

    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Refused locally before anything was sent.
    #[error("Quota exceeded ({}): {used} of {limit} hotspots used", reason.as_str())]
    QuotaPrecheck {
        reason: QuotaReason,
        used: i64,
        limit: i64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// One state transition of one mutation, for the UI to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationEvent {
    pub kind: MutationKind,
    pub key: HotspotKey,
    pub state: MutationState,
}

struct EditorState {
    page: PageRecord,
    /// In stacking order, lowest first.
    hotspots: Vec<LocalHotspot>,
    notices: Vec<Notice>,
    events: Vec<MutationEvent>,
    session: Session,
    next_temp: u64,
}

impl EditorState {
    fn position(&self, key: HotspotKey) -> Option<usize> {
        self.hotspots.iter().position(|h| h.key == key)
    }

    fn record(&mut self, kind: MutationKind, key: HotspotKey, state: MutationState) {
        self.events.push(MutationEvent { kind, key, state });
    }

    fn replace_with_snapshot(&mut self, snapshot: PageSnapshot) {
        self.page = snapshot.page;
        self.hotspots = snapshot.hotspots.into_iter().map(Into::into).collect();
    }
}

struct Inner<S> {
    store: S,
    slug: String,
    edit_token: String,
    state: Mutex<EditorState>,
    /// Stored ids with an update or delete awaiting the store. Kept outside
    /// `state` so a dropped mutation can release its id synchronously.
    in_flight: parking_lot::Mutex<HashSet<DbId>>,
}

impl<S> Inner<S> {
    /// Reserve `id` for one update or delete.
    fn claim(&self, id: DbId) -> Result<InFlight<'_>, EditorError> {
        if !self.in_flight.lock().insert(id) {
            return Err(EditorError::MutationInFlight(id));
        }
        Ok(InFlight {
            set: &self.in_flight,
            id,
        })
    }
}

/// Releases its hotspot id when the mutation finishes or is dropped.
struct InFlight<'a> {
    set: &'a parking_lot::Mutex<HashSet<DbId>>,
    id: DbId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

/// Editing handle for one page. Cheap to clone; clones share state.
///
/// A mutation future dropped before the store answers frees its hotspot for
/// further changes but leaves the local effect unconfirmed; [`Editor::reload`]
/// brings local state back in line with the store.
pub struct Editor<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Editor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("slug", &self.inner.slug)
            .finish_non_exhaustive()
    }
}

impl<S: HotspotStore> Editor<S> {
    /// Load `slug` and start editing it with `edit_token`.
    ///
    /// The token is not checked here; the store checks it on every mutation.
    pub async fn open(
        store: S,
        slug: impl Into<String>,
        edit_token: impl Into<String>,
        session: Session,
    ) -> Result<Self, EditorError> {
        let slug = slug.into();
        let snapshot = store.load_page(&slug).await?;
        tracing::debug!(
            slug = %slug,
            hotspots = snapshot.hotspots.len(),
            "Editor opened"
        );

        let mut state = EditorState {
            page: snapshot.page.clone(),
            hotspots: Vec::new(),
            notices: Vec::new(),
            events: Vec::new(),
            session,
            next_temp: 1,
        };
        state.replace_with_snapshot(snapshot);

        Ok(Self {
            inner: Arc::new(Inner {
                store,
                slug,
                edit_token: edit_token.into(),
                state: Mutex::new(state),
                in_flight: parking_lot::Mutex::new(HashSet::new()),
            }),
        })
    }

    /// Create a fresh page and open it. The returned [`CreatedPage`] is the
    /// only time the edit token is handed out.
    pub async fn create_page(
        store: S,
        title: Option<&str>,
        session: Session,
    ) -> Result<(Self, CreatedPage), EditorError> {
        let title = normalize_title(title)?;
        let created = store.create_page(title.as_deref()).await?;
        tracing::info!(slug = %created.slug, page_id = created.id, "Page created");

        let editor = Self::open(store, created.slug.clone(), created.edit_token.clone(), session)
            .await?;
        Ok((editor, created))
    }

    // ---- reads ----

    pub fn slug(&self) -> &str {
        &self.inner.slug
    }

    pub fn share_links(&self, base: &str) -> ShareLinks {
        ShareLinks::new(base, &self.inner.slug, &self.inner.edit_token)
    }

    pub async fn page(&self) -> PageRecord {
        self.inner.state.lock().await.page.clone()
    }

    /// Current hotspots, provisional ones included, in stacking order.
    pub async fn hotspots(&self) -> Vec<LocalHotspot> {
        self.inner.state.lock().await.hotspots.clone()
    }

    pub async fn session(&self) -> Session {
        self.inner.state.lock().await.session.clone()
    }

    /// Hotspots the current user may still add here, `None` when unbounded.
    pub async fn remaining_hotspots(&self) -> Option<i64> {
        let state = self.inner.state.lock().await;
        state
            .session
            .remaining_hotspots(state.hotspots.len() as i64)
    }

    /// Take every queued notice, oldest first.
    pub async fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.inner.state.lock().await.notices)
    }

    /// Take every recorded mutation transition, oldest first.
    pub async fn drain_events(&self) -> Vec<MutationEvent> {
        std::mem::take(&mut self.inner.state.lock().await.events)
    }

    // ---- session ----

    pub async fn set_session(&self, session: Session) {
        self.inner.state.lock().await.session = session;
    }

    pub async fn sign_out(&self) {
        self.inner.state.lock().await.session.sign_out();
    }

    /// Fetch the signed-in user's usage. A no-op when anonymous.
    pub async fn refresh_usage(&self) -> Result<(), EditorError> {
        if !self.inner.state.lock().await.session.is_signed_in() {
            return Ok(());
        }
        let usage = self.inner.store.fetch_usage().await?;
        self.inner.state.lock().await.session.apply_usage(usage);
        Ok(())
    }

    async fn refresh_usage_best_effort(&self) {
        if let Err(e) = self.refresh_usage().await {
            tracing::warn!(error = %e, "Failed to refresh usage");
        }
    }

    // ---- mutations ----

    /// Re-fetch the page and every hotspot, discarding local state.
    ///
    /// Provisional records are discarded too; a create that is still in
    /// flight re-inserts its record when it completes.
    pub async fn reload(&self) -> Result<(), EditorError> {
        if let Err(e) = self.resync().await {
            self.inner
                .state
                .lock()
                .await
                .notices
                .push(Notice::error("Failed to reload page"));
            return Err(e.into());
        }
        Ok(())
    }

    /// Replace local state with the store's. Queues no notice; callers
    /// recovering from a failed mutation have already reported it.
    async fn resync(&self) -> Result<(), StoreError> {
        match self.inner.store.load_page(&self.inner.slug).await {
            Ok(snapshot) => {
                tracing::debug!(
                    slug = %self.inner.slug,
                    hotspots = snapshot.hotspots.len(),
                    "Page reloaded"
                );
                self.inner.state.lock().await.replace_with_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(slug = %self.inner.slug, error = %e, "Reload failed");
                Err(e)
            }
        }
    }

    /// Add a hotspot at `fraction` with tooltip `text`.
    ///
    /// Returns the stored key once the store has accepted it.
    pub async fn create(&self, fraction: Fraction, text: &str) -> Result<HotspotKey, EditorError> {
        let fraction = Fraction::new(fraction.x, fraction.y)?;
        let text = normalize_text(text)?;

        let (temp_key, input) = {
            let mut state = self.inner.state.lock().await;

            let on_page = state.hotspots.len() as i64;
            if let Err(CoreError::QuotaExceeded {
                reason,
                used,
                limit,
            }) = state.session.can_create_hotspot(on_page)
            {
                tracing::info!(reason = reason.as_str(), used, limit, "Create refused locally");
                state.notices.push(Notice::UpgradePrompt {
                    reason,
                    used,
                    limit,
                });
                return Err(EditorError::QuotaPrecheck {
                    reason,
                    used,
                    limit,
                });
            }

            let temp_id = state.next_temp;
            state.next_temp += 1;
            let page_id = state.page.id;
            let provisional = LocalHotspot::provisional(temp_id, page_id, fraction, text.clone());
            let key = provisional.key;
            state.hotspots.push(provisional);
            state.record(MutationKind::Create, key, MutationState::Pending);

            let input = NewHotspot {
                page_id,
                x_pct: fraction.x,
                y_pct: fraction.y,
                text,
            };
            (key, input)
        };

        let result = self
            .inner
            .store
            .create_hotspot(&self.inner.edit_token, &input)
            .await;

        let mut state = self.inner.state.lock().await;
        match result {
            Ok(record) => {
                let stored = HotspotKey::Stored(record.id);
                tracing::info!(hotspot_id = record.id, temp = %temp_key, "Hotspot created");

                match state.position(temp_key) {
                    Some(idx) => state.hotspots[idx] = record.into(),
                    // A reload ran meanwhile; it may or may not have seen this hotspot.
                    None if state.position(stored).is_none() => state.hotspots.push(record.into()),
                    None => {}
                }
                state.record(MutationKind::Create, temp_key, MutationState::Confirmed);
                drop(state);

                self.refresh_usage_best_effort().await;
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!(temp = %temp_key, error = %e, "Hotspot create failed");
                state.hotspots.retain(|h| h.key != temp_key);
                state.record(MutationKind::Create, temp_key, MutationState::RolledBack);
                state
                    .notices
                    .push(Notice::for_failure(&e, "Failed to create hotspot"));
                Err(e.into())
            }
        }
    }

    /// Change some fields of a stored hotspot.
    ///
    /// Fields equal to the current values are dropped; if nothing is left
    /// no request is made and `Ok(None)` is returned.
    pub async fn update(
        &self,
        id: DbId,
        mut patch: HotspotPatch,
    ) -> Result<Option<LocalHotspot>, EditorError> {
        if let Some(text) = &patch.text {
            patch.text = Some(normalize_text(text)?);
        }
        if let Some(x) = patch.x_pct {
            validate_fraction("x_pct", x)?;
        }
        if let Some(y) = patch.y_pct {
            validate_fraction("y_pct", y)?;
        }

        let key = HotspotKey::Stored(id);
        let (patch, claim) = {
            let mut state = self.inner.state.lock().await;
            let claim = self.inner.claim(id)?;
            let idx = state.position(key).ok_or(EditorError::UnknownHotspot(id))?;

            let patch = patch.without_unchanged(&state.hotspots[idx]);
            if patch.is_empty() {
                tracing::debug!(hotspot_id = id, "Update is a no-op");
                return Ok(None);
            }

            let hotspot = &mut state.hotspots[idx];
            hotspot.apply(&patch);
            hotspot.state = MutationState::Pending;
            state.record(MutationKind::Update, key, MutationState::Pending);
            (patch, claim)
        };

        let result = self
            .inner
            .store
            .update_hotspot(&self.inner.edit_token, id, &patch)
            .await;

        let mut state = self.inner.state.lock().await;
        drop(claim);
        match result {
            Ok(record) => {
                tracing::info!(hotspot_id = id, "Hotspot updated");
                let confirmed = LocalHotspot::from(record);
                if let Some(idx) = state.position(key) {
                    state.hotspots[idx] = confirmed.clone();
                }
                state.record(MutationKind::Update, key, MutationState::Confirmed);
                Ok(Some(confirmed))
            }
            Err(e) => {
                tracing::warn!(hotspot_id = id, error = %e, "Hotspot update failed, reloading");
                state.record(MutationKind::Update, key, MutationState::RolledBack);
                state
                    .notices
                    .push(Notice::for_failure(&e, "Failed to update hotspot"));
                drop(state);

                // A failed resync is logged; the notice above already told the user.
                let _ = self.resync().await;
                Err(e.into())
            }
        }
    }

    /// Remove a stored hotspot.
    pub async fn delete(&self, id: DbId) -> Result<(), EditorError> {
        let key = HotspotKey::Stored(id);
        let claim = {
            let mut state = self.inner.state.lock().await;
            let claim = self.inner.claim(id)?;
            let idx = state.position(key).ok_or(EditorError::UnknownHotspot(id))?;
            state.hotspots.remove(idx);
            state.record(MutationKind::Delete, key, MutationState::Pending);
            claim
        };

        let result = self
            .inner
            .store
            .delete_hotspot(&self.inner.edit_token, id)
            .await;

        let mut state = self.inner.state.lock().await;
        drop(claim);
        match result {
            Ok(()) => {
                tracing::info!(hotspot_id = id, "Hotspot deleted");
                // A reload while the request was out may have brought it back.
                state.hotspots.retain(|h| h.key != key);
                state.record(MutationKind::Delete, key, MutationState::Confirmed);
                state.notices.push(Notice::success("Hotspot deleted"));
                drop(state);

                self.refresh_usage_best_effort().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(hotspot_id = id, error = %e, "Hotspot delete failed, reloading");
                state.record(MutationKind::Delete, key, MutationState::RolledBack);
                state
                    .notices
                    .push(Notice::for_failure(&e, "Failed to delete hotspot"));
                drop(state);

                let _ = self.resync().await;
                Err(e.into())
            }
        }
    }

    /// Set or clear the page title. Only applied once the store accepts it.
    pub async fn rename(&self, title: Option<&str>) -> Result<PageRecord, EditorError> {
        let title = normalize_title(title)?;
        let result = self
            .inner
            .store
            .rename_page(&self.inner.edit_token, &self.inner.slug, title.as_deref())
            .await;

        let mut state = self.inner.state.lock().await;
        match result {
            Ok(page) => {
                tracing::info!(slug = %self.inner.slug, "Page renamed");
                state.page = page.clone();
                state.notices.push(Notice::success("Title updated"));
                Ok(page)
            }
            Err(e) => {
                tracing::warn!(slug = %self.inner.slug, error = %e, "Page rename failed");
                state.notices.push(Notice::error("Failed to update title"));
                Err(e.into())
            }
        }
    }
}
