#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;

use hotspot_api::app::build_router;
use hotspot_api::auth::jwt::{Claims, JwtConfig};
use hotspot_api::config::ServerConfig;
use hotspot_api::middleware::edit_token::EDIT_TOKEN_HEADER;
use hotspot_api::state::AppState;
use hotspot_core::quota::PlanType;
use hotspot_db::models::user_profile::CreateUserProfile;
use hotspot_db::repositories::UserProfileRepo;

/// Hotspot cap used by every integration test.
pub const TEST_LIMIT: i64 = 10;

/// Secret shared with the token issuer in tests.
pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            leeway_secs: 0,
        },
        hotspot_limit: TEST_LIMIT,
    }
}

/// The production router over `pool`, configured with [`test_config`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_router(AppState {
        pool,
        config: Arc::new(test_config()),
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Credentials to attach to a request.
#[derive(Default, Clone, Copy)]
pub struct Creds<'a> {
    pub edit_token: Option<&'a str>,
    pub bearer: Option<&'a str>,
}

impl<'a> Creds<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn token(token: &'a str) -> Self {
        Self {
            edit_token: Some(token),
            bearer: None,
        }
    }

    pub fn bearer(jwt: &'a str) -> Self {
        Self {
            edit_token: None,
            bearer: Some(jwt),
        }
    }

    pub fn both(token: &'a str, jwt: &'a str) -> Self {
        Self {
            edit_token: Some(token),
            bearer: Some(jwt),
        }
    }
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    creds: Creds<'_>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = creds.edit_token {
        builder = builder.header(EDIT_TOKEN_HEADER, token);
    }
    if let Some(jwt) = creds.bearer {
        builder = builder.header(AUTHORIZATION, format!("Bearer {jwt}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// POST `body` verbatim with an optional content type, for bodies that
/// are not valid JSON.
pub async fn post_raw(
    app: Router,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
    creds: Creds<'_>,
) -> Response<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    if let Some(token) = creds.edit_token {
        builder = builder.header(EDIT_TOKEN_HEADER, token);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Creds::none()).await
}

pub async fn get_with(app: Router, uri: &str, creds: Creds<'_>) -> Response<Body> {
    send(app, Method::GET, uri, None, creds).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    creds: Creds<'_>,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), creds).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    creds: Creds<'_>,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body), creds).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    creds: Creds<'_>,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), creds).await
}

pub async fn delete(app: Router, uri: &str, creds: Creds<'_>) -> Response<Body> {
    send(app, Method::DELETE, uri, None, creds).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A page created through the API.
pub struct TestPage {
    pub id: i64,
    pub slug: String,
    pub token: String,
}

/// Create a page through `POST /api/v1/page`, optionally as a signed-in user.
pub async fn create_page(pool: &PgPool, bearer: Option<&str>) -> TestPage {
    let creds = Creds {
        edit_token: None,
        bearer,
    };
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/page",
        serde_json::json!({ "title": "Test page" }),
        creds,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    TestPage {
        id: json["data"]["id"].as_i64().unwrap(),
        slug: json["data"]["slug"].as_str().unwrap().to_string(),
        token: json["data"]["edit_token"].as_str().unwrap().to_string(),
    }
}

/// Create a hotspot through `POST /api/v1/hotspot` and return the response.
pub async fn create_hotspot(
    pool: &PgPool,
    page: &TestPage,
    text: &str,
    bearer: Option<&str>,
) -> Response<Body> {
    let creds = Creds {
        edit_token: Some(&page.token),
        bearer,
    };
    post_json(
        build_test_app(pool.clone()),
        "/api/v1/hotspot",
        serde_json::json!({
            "page_id": page.id,
            "x_pct": 0.25,
            "y_pct": 0.75,
            "text": text,
        }),
        creds,
    )
    .await
}

/// Provision a user with the given plan and return `(user_id, jwt)`.
pub async fn signed_in_user(pool: &PgPool, email: &str, plan: PlanType) -> (i64, String) {
    let profile = UserProfileRepo::create(
        pool,
        &CreateUserProfile {
            email: email.to_string(),
            full_name: None,
            plan_type: plan,
        },
    )
    .await
    .unwrap();
    (profile.id, issue_token(profile.id))
}

/// Sign a fifteen-minute access token for `user_id`, as the auth provider would.
pub fn issue_token(user_id: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        exp: now + 15 * 60,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}
