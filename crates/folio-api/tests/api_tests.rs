//! API Integration Tests
//!
//! Drive the full router with in-memory stores, or read-only JSON files in a
//! temporary directory.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use folio_api::auth::{AuthService, JwtConfig, TokenIssuer};
use folio_api::create_router;
use folio_api::state::{AppState, ContentStores};
use folio_core::config::AppConfig;
use folio_store::{MemoryRefreshTokenStore, MemoryUserStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 3600,
    }
}

/// Router over in-memory content with auth enabled
fn create_app_with_auth() -> Router {
    let auth = AuthService::new(
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryRefreshTokenStore::new()),
        TokenIssuer::new(&jwt_config()),
    );
    let state = AppState::new(
        AppConfig::default(),
        ContentStores::memory(),
        Some(Arc::new(auth)),
    );
    create_router(Arc::new(state))
}

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    create_authed_request(method, uri, None, body)
}

fn create_authed_request(
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> Value {
    let response = send(
        app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_app_with_auth();

    let response = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["backend"], "memory");
    assert_eq!(json["auth_enabled"], true);
}

#[tokio::test]
async fn test_openapi_json() {
    let app = create_app_with_auth();

    let response = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/api/v1/auth/register"].is_object());
}

// =============================================================================
// Gate Tests
// =============================================================================

#[tokio::test]
async fn test_get_passes_without_token() {
    let app = create_app_with_auth();

    let response = send(&app, create_json_request("GET", "/api/v1/projects", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_post_without_header_is_unauthorized() {
    let app = create_app_with_auth();

    let response = send(
        &app,
        create_json_request("POST", "/api/v1/projects", Some(json!({ "title": "X" }))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing Authorization header");
    assert_eq!(json["status"], 401);
}

#[tokio::test]
async fn test_malformed_authorization_headers() {
    let app = create_app_with_auth();

    for value in ["Token abc", "Bearer", "Bearer a b"] {
        let response = send(
            &app,
            create_authed_request(
                "POST",
                "/api/v1/projects",
                Some(value),
                Some(json!({ "title": "X" })),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header {value:?}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid Authorization header format");
    }
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = create_app_with_auth();

    // signed for a different deployment
    let foreign = TokenIssuer::new(&JwtConfig {
        access_secret: "other-access".to_string(),
        refresh_secret: "other-refresh".to_string(),
        ..jwt_config()
    })
    .issue_access("user-1")
    .unwrap();

    for token in ["garbage", foreign.as_str()] {
        let response = send(
            &app,
            create_authed_request(
                "DELETE",
                "/api/v1/projects/p1",
                Some(&format!("Bearer {token}")),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Invalid or expired token");
    }
}

// =============================================================================
// Auth Flow Tests
// =============================================================================

#[tokio::test]
async fn test_register_login_and_write() {
    let app = create_app_with_auth();

    let registered = register(&app, "a@x", "pw1").await;
    assert_eq!(registered["token_type"], "Bearer");
    assert_eq!(registered["expires_in"], 900);
    assert_eq!(registered["user"]["email"], "a@x");
    assert!(registered["user"].get("password_hash").is_none());

    // wrong password
    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "a@x", "password": "pw2" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // right password
    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "a@x", "password": "pw1" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;
    let access = login["access_token"].as_str().unwrap().to_string();

    let response = send(
        &app,
        create_authed_request(
            "POST",
            "/api/v1/projects",
            Some(&format!("Bearer {access}")),
            Some(json!({ "title": "X" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let project = body_json(response).await;
    assert_eq!(project["title"], "X");
    assert!(!project["id"].as_str().unwrap().is_empty());

    let response = send(&app, create_json_request("GET", "/api/v1/projects", None)).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = create_app_with_auth();
    register(&app, "a@x", "pw1").await;

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "email": "a@x", "password": "pw9" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_requires_email_and_password() {
    let app = create_app_with_auth();

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({ "email": "", "password": "pw1" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_and_logout() {
    let app = create_app_with_auth();
    let registered = register(&app, "a@x", "pw1").await;
    let refresh_token = registered["refresh_token"].as_str().unwrap();

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert!(refreshed["access_token"].is_string());
    assert!(refreshed.get("refresh_token").is_none());

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/logout",
            Some(json!({ "refresh_token": refresh_token })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["message"],
        "Refresh token has been revoked"
    );
}

#[tokio::test]
async fn test_logout_with_bad_token() {
    let app = create_app_with_auth();

    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/logout",
            Some(json!({ "refresh_token": "not-a-token" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_refresh_token_is_bad_request() {
    let app = create_app_with_auth();

    for uri in ["/api/v1/auth/refresh", "/api/v1/auth/logout"] {
        let response = send(
            &app,
            create_json_request("POST", uri, Some(json!({ "refresh_token": "" }))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["message"], "refresh_token is required");
    }
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = create_app_with_auth();
    let registered = register(&app, "a@x", "pw1").await;
    let access = registered["access_token"].as_str().unwrap();

    let response = send(&app, create_json_request("GET", "/api/v1/auth/me", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        create_authed_request(
            "GET",
            "/api/v1/auth/me",
            Some(&format!("Bearer {access}")),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["email"], "a@x");
    assert_eq!(me["id"], registered["user"]["id"]);
}

// =============================================================================
// Content Tests
// =============================================================================

#[tokio::test]
async fn test_content_crud() {
    let app = create_app_with_auth();
    let registered = register(&app, "a@x", "pw1").await;
    let bearer = format!("Bearer {}", registered["access_token"].as_str().unwrap());

    let response = send(
        &app,
        create_authed_request(
            "POST",
            "/api/v1/skills",
            Some(&bearer),
            Some(json!({ "id": "rust", "name": "Rust", "level": 5, "category": "lang" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // duplicate id
    let response = send(
        &app,
        create_authed_request(
            "POST",
            "/api/v1/skills",
            Some(&bearer),
            Some(json!({ "id": "rust", "name": "Rust again" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // path id wins over body id
    let response = send(
        &app,
        create_authed_request(
            "PUT",
            "/api/v1/skills/rust",
            Some(&bearer),
            Some(json!({ "id": "ignored", "name": "Rust", "level": 4, "category": "lang" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], "rust");

    let response = send(&app, create_json_request("GET", "/api/v1/skills/rust", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["level"], 4);

    let response = send(
        &app,
        create_authed_request("DELETE", "/api/v1/skills/rust", Some(&bearer), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, create_json_request("GET", "/api/v1/skills/rust", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");

    let response = send(
        &app,
        create_authed_request("PUT", "/api/v1/skills/missing", Some(&bearer), Some(json!({ "name": "Go" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_primary_field() {
    let app = create_app_with_auth();
    let registered = register(&app, "a@x", "pw1").await;
    let bearer = format!("Bearer {}", registered["access_token"].as_str().unwrap());

    let response = send(
        &app,
        create_authed_request(
            "POST",
            "/api/v1/contacts",
            Some(&bearer),
            Some(json!({ "github": "someone" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "email is required");
}

// =============================================================================
// Read-only JSON Backend Tests
// =============================================================================

#[tokio::test]
async fn test_json_backend_is_read_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("posts.json"),
        r#"[{"id": "hello", "title": "Hello", "content": "First post", "tags": ["intro"], "published_at": "2024-01-01"}]"#,
    )
    .unwrap();

    let state = AppState::new(AppConfig::default(), ContentStores::json(dir.path()), None);
    let app = create_router(Arc::new(state));

    let response = send(&app, create_json_request("GET", "/api/v1/posts/hello", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["tags"], json!(["intro"]));

    let response = send(
        &app,
        create_json_request("POST", "/api/v1/posts", Some(json!({ "title": "New" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["code"], "READ_ONLY");

    // auth routes are not mounted without a database
    let response = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({ "email": "a@x", "password": "pw1" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    let health = body_json(response).await;
    assert_eq!(health["backend"], "json");
    assert_eq!(health["auth_enabled"], false);
}

#[tokio::test]
async fn test_json_backend_missing_file_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(AppConfig::default(), ContentStores::json(dir.path()), None);
    let app = create_router(Arc::new(state));

    let response = send(&app, create_json_request("GET", "/api/v1/projects", None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
