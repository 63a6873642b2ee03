//! Handlers for pages: creation, the public view, rename and image attach.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use hotspot_core::capability::authorize;
use hotspot_core::page::{generate_edit_token, generate_slug, normalize_title, validate_slug};
use hotspot_db::models::page::{
    AttachImage, CreatePage, CreatedPage, Page, PageWithHotspots, UpdatePage,
};
use hotspot_db::repositories::page_repo::is_slug_collision;
use hotspot_db::repositories::{HotspotRepo, PageRepo, UsageRepo, UserProfileRepo};
use hotspot_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::edit_token::EditToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// How many fresh slugs to try before giving up on page creation.
const MAX_SLUG_ATTEMPTS: usize = 5;

/// POST /page
///
/// Create an empty page. The edit token is returned here and nowhere else.
/// A signed-in caller becomes the page's owner, getting a free-plan
/// profile if this is the first the database has heard of them.
pub async fn create_page(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreatePage>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let title = normalize_title(input.title.as_deref())?;
    let owner_id = auth.user_id();
    if let Some(owner) = owner_id {
        if UserProfileRepo::ensure(&state.pool, owner).await? {
            tracing::info!(user_id = owner, "Provisioned free-plan profile");
        }
    }

    let mut attempt = 0;
    let page = loop {
        attempt += 1;
        let slug = generate_slug();
        let token = generate_edit_token();
        match PageRepo::create(&state.pool, &slug, &token, title.as_deref(), owner_id).await {
            Ok(page) => break page,
            Err(e) if is_slug_collision(&e) && attempt < MAX_SLUG_ATTEMPTS => {
                tracing::debug!(slug = %slug, attempt, "Slug collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    };

    tracing::info!(page_id = page.id, slug = %page.slug, owner_id = ?owner_id, "Page created");

    if let Some(owner) = owner_id {
        UsageRepo::refresh_best_effort(&state.pool, owner).await;
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedPage::from(page),
        }),
    ))
}

/// GET /page/{slug}
///
/// Public view: page metadata (never the token) and its hotspots in
/// stacking order.
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<PageWithHotspots>>> {
    if validate_slug(&slug).is_err() {
        return Err(page_not_found());
    }
    let page = PageRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(page_not_found)?;
    let hotspots = HotspotRepo::list_by_page(&state.pool, page.id).await?;

    Ok(Json(DataResponse {
        data: PageWithHotspots { page, hotspots },
    }))
}

/// PATCH /page/{slug}
///
/// Rename a page. A blank title clears it.
pub async fn update_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    token: EditToken,
    AppJson(input): AppJson<UpdatePage>,
) -> AppResult<Json<DataResponse<Page>>> {
    input.validate()?;
    let title = normalize_title(input.title.as_deref())?;

    let page = authorized_page(&state.pool, &slug, &token).await?;
    let updated = PageRepo::update_title(&state.pool, page.id, title.as_deref())
        .await?
        .ok_or_else(page_not_found)?;

    tracing::info!(page_id = updated.id, "Page renamed");
    Ok(Json(DataResponse { data: updated }))
}

/// PUT /page/{slug}/image
///
/// Record the image the storage collaborator returned for this page.
pub async fn attach_image(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    token: EditToken,
    AppJson(input): AppJson<AttachImage>,
) -> AppResult<Json<DataResponse<Page>>> {
    input.validate()?;

    let page = authorized_page(&state.pool, &slug, &token).await?;
    let updated = PageRepo::attach_image(&state.pool, page.id, &input)
        .await?
        .ok_or_else(page_not_found)?;

    tracing::info!(
        page_id = updated.id,
        image_path = %input.image_path,
        "Page image attached"
    );
    Ok(Json(DataResponse { data: updated }))
}

/// Load a page by slug and check the presented token against it.
///
/// A missing page and a wrong token produce the same denial.
async fn authorized_page(pool: &DbPool, slug: &str, token: &EditToken) -> AppResult<Page> {
    let page = PageRepo::find_by_slug(pool, slug).await?;
    authorize(page.as_ref().map(|p| p.edit_token.as_str()), token.as_str()).into_result()?;
    page.ok_or_else(|| AppError::InternalError("authorized a page that does not exist".into()))
}

fn page_not_found() -> AppError {
    AppError::NotFound("Page not found".into())
}
