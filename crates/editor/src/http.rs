//! [`HotspotStore`] over the HTTP API, using [`reqwest`].

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use hotspot_core::quota::QuotaReason;
use hotspot_core::types::DbId;

use crate::model::{
    CreatedPage, HotspotPatch, HotspotRecord, NewHotspot, PageRecord, PageSnapshot, UsageSummary,
};
use crate::store::{HotspotStore, StoreError};

/// Header carrying the page capability.
pub const EDIT_TOKEN_HEADER: &str = "X-Edit-Token";

/// HTTP client for one API deployment.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    /// API root including the version prefix, e.g. `http://host:3000/api/v1`.
    api_url: String,
    /// Signed-in identity, sent as a bearer token when present.
    bearer: Option<String>,
}

/// `{ "data": T }` success envelope.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// `{ "error", "code", ... }` failure body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    used: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

#[derive(Serialize)]
struct TitleBody<'a> {
    title: Option<&'a str>,
}

impl HttpStore {
    /// Create a client for the API at `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bearer: None,
        }
    }

    /// Act as a signed-in user from now on.
    pub fn with_bearer(mut self, jwt: impl Into<String>) -> Self {
        self.bearer = Some(jwt.into());
        self
    }

    /// Drop the signed-in identity.
    pub fn clear_bearer(&mut self) {
        self.bearer = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.bearer {
            Some(jwt) => builder.bearer_auth(jwt),
            None => builder,
        }
    }

    fn gated(
        &self,
        method: reqwest::Method,
        path: &str,
        edit_token: &str,
    ) -> reqwest::RequestBuilder {
        self.request(method, path).header(EDIT_TOKEN_HEADER, edit_token)
    }

    // ---- private helpers ----

    async fn send<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, StoreError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Transient(format!("Malformed response: {e}")))?;
        Ok(envelope.data)
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    tracing::warn!(error = %err, "Store request failed");
    StoreError::Transient(err.to_string())
}

/// Map a non-2xx response onto the failure taxonomy.
pub fn classify_failure(status: StatusCode, body: &str) -> StoreError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .map(|b| b.error.clone())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    match status {
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized(message),
        StatusCode::FORBIDDEN => StoreError::Forbidden(message),
        StatusCode::PAYMENT_REQUIRED => {
            let body = parsed.as_ref();
            let reason = body
                .and_then(|b| b.reason.as_deref())
                .and_then(QuotaReason::parse);
            match (reason, body.and_then(|b| b.used), body.and_then(|b| b.limit)) {
                (Some(reason), Some(used), Some(limit)) => {
                    StoreError::QuotaExceeded { reason, used, limit }
                }
                _ => StoreError::Transient(format!("Unparseable quota response: {message}")),
            }
        }
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            StoreError::Validation(message)
        }
        _ => StoreError::Transient(format!("{status}: {message}")),
    }
}

#[async_trait]
impl HotspotStore for HttpStore {
    async fn load_page(&self, slug: &str) -> Result<PageSnapshot, StoreError> {
        Self::send(self.request(reqwest::Method::GET, &format!("/page/{slug}"))).await
    }

    async fn create_page(&self, title: Option<&str>) -> Result<CreatedPage, StoreError> {
        Self::send(
            self.request(reqwest::Method::POST, "/page")
                .json(&TitleBody { title }),
        )
        .await
    }

    async fn rename_page(
        &self,
        edit_token: &str,
        slug: &str,
        title: Option<&str>,
    ) -> Result<PageRecord, StoreError> {
        Self::send(
            self.gated(reqwest::Method::PATCH, &format!("/page/{slug}"), edit_token)
                .json(&TitleBody { title }),
        )
        .await
    }

    async fn create_hotspot(
        &self,
        edit_token: &str,
        input: &NewHotspot,
    ) -> Result<HotspotRecord, StoreError> {
        Self::send(
            self.gated(reqwest::Method::POST, "/hotspot", edit_token)
                .json(input),
        )
        .await
    }

    async fn update_hotspot(
        &self,
        edit_token: &str,
        id: DbId,
        patch: &HotspotPatch,
    ) -> Result<HotspotRecord, StoreError> {
        Self::send(
            self.gated(reqwest::Method::PATCH, &format!("/hotspot/{id}"), edit_token)
                .json(patch),
        )
        .await
    }

    async fn delete_hotspot(&self, edit_token: &str, id: DbId) -> Result<(), StoreError> {
        #[derive(Deserialize)]
        struct Deleted {
            #[allow(dead_code)]
            deleted: bool,
        }
        let _: Deleted = Self::send(self.gated(
            reqwest::Method::DELETE,
            &format!("/hotspot/{id}"),
            edit_token,
        ))
        .await?;
        Ok(())
    }

    async fn fetch_usage(&self) -> Result<UsageSummary, StoreError> {
        if self.bearer.is_none() {
            return Err(StoreError::Unauthorized("Not signed in".into()));
        }
        Self::send(self.request(reqwest::Method::GET, "/me/usage")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn quota_body_maps_to_quota_exceeded() {
        let body = r#"{"error":"Hotspot limit reached (10 of 10)","code":"QUOTA_EXCEEDED","reason":"free_plan_limit","used":10,"limit":10}"#;
        assert_matches!(
            classify_failure(StatusCode::PAYMENT_REQUIRED, body),
            StoreError::QuotaExceeded {
                reason: QuotaReason::FreePlanLimit,
                used: 10,
                limit: 10,
            }
        );
    }

    #[test]
    fn denial_keeps_server_message() {
        let body = r#"{"error":"Invalid edit token or page not found","code":"FORBIDDEN"}"#;
        assert_eq!(
            classify_failure(StatusCode::FORBIDDEN, body),
            StoreError::Forbidden("Invalid edit token or page not found".into())
        );
    }

    #[test]
    fn unparseable_body_still_classifies_by_status() {
        assert_matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "<html>"),
            StoreError::Unauthorized(_)
        );
        assert_matches!(
            classify_failure(StatusCode::BAD_GATEWAY, ""),
            StoreError::Transient(_)
        );
        assert_matches!(
            classify_failure(StatusCode::NOT_FOUND, ""),
            StoreError::NotFound(_)
        );
    }

    #[test]
    fn quota_status_without_detail_is_transient() {
        assert_matches!(
            classify_failure(StatusCode::PAYMENT_REQUIRED, r#"{"error":"nope"}"#),
            StoreError::Transient(_)
        );
    }
}
