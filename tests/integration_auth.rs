mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    create_role, create_superadmin, create_user, get_request, json_request, login,
    seed_permissions, send, setup_test_app,
};
use quillboard::quillboard_core::permissions::{BLOGS_CREATE, BLOGS_VIEW};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success(pool: PgPool) {
    create_superadmin(&pool, "admin@example.com").await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@example.com", "password": common::PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert!(body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_superadmin(&pool, "admin@example.com").await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@example.com", "password": "not-it" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_invalid_email_is_422(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "nope", "password": "x" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["email"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_lists_effective_permissions(pool: PgPool) {
    seed_permissions(&pool).await;
    let role = create_role(&pool, "writer", &[BLOGS_VIEW, BLOGS_CREATE]).await;
    create_user(&pool, "writer@example.com", &[role]).await;
    let app = setup_test_app(pool);
    let token = login(&app, "writer@example.com").await;

    let (status, body) = send(&app, get_request("/api/auth/me", &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSuperadmin"], false);
    assert_eq!(body["roles"], json!(["writer"]));
    assert_eq!(
        body["effectivePermissionSlugs"],
        json!([BLOGS_CREATE, BLOGS_VIEW])
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_superadmin_sees_whole_catalog(pool: PgPool) {
    create_superadmin(&pool, "admin@example.com").await;
    let app = setup_test_app(pool);
    let token = login(&app, "admin@example.com").await;

    let (status, body) = send(&app, get_request("/api/auth/me", &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSuperadmin"], true);
    assert_eq!(
        body["effectivePermissionSlugs"].as_array().unwrap().len(),
        quillboard::quillboard_core::permissions::ALL.len()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_and_malformed_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");

    let (status, _) = send(&app, get_request("/api/auth/me", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_revoked_grant_applies_to_existing_token(pool: PgPool) {
    seed_permissions(&pool).await;
    let role = create_role(&pool, "reader", &[BLOGS_VIEW]).await;
    create_user(&pool, "reader@example.com", &[role]).await;
    let app = setup_test_app(pool.clone());
    let token = login(&app, "reader@example.com").await;

    let (status, _) = send(&app, get_request("/api/blogs", &token)).await;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("UPDATE permissions SET is_active = FALSE WHERE slug = $1")
        .bind(BLOGS_VIEW)
        .execute(&pool)
        .await
        .unwrap();

    let (status, body) = send(&app, get_request("/api/blogs", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");
}
