#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use quillboard::quillboard_config::{CorsConfig, JwtConfig, StorageConfig};
use quillboard::quillboard_core::password::hash_password;
use quillboard::quillboard_core::permissions::{ALL, SUPERADMIN_ROLE};
use quillboard::router::init_router;
use quillboard::state::AppState;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub fn test_state(pool: PgPool) -> AppState {
    let storage = StorageConfig {
        dir: std::env::temp_dir().join(format!("quillboard-test-{}", uuid::Uuid::new_v4())),
        base_url: "http://localhost:3000/storage".to_string(),
        max_upload_bytes: 2 * 1024 * 1024,
    };
    AppState::new(
        pool,
        JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry: 3600,
        },
        CorsConfig::from_list("http://localhost:5173"),
        storage,
    )
}

pub fn setup_test_app(pool: PgPool) -> Router {
    init_router(test_state(pool))
}

/// App plus the directory its file storage writes into.
pub fn setup_test_app_with_storage(pool: PgPool) -> (Router, PathBuf) {
    let state = test_state(pool);
    let dir = state.storage_config.dir.clone();
    (init_router(state), dir)
}

/// Writes a stored image under `dir` and points the blog at it.
pub async fn attach_stored_image(pool: &PgPool, dir: &Path, blog_id: i64) -> PathBuf {
    let key = format!("blogs/cover-{blog_id}.png");
    let path = dir.join(&key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
    sqlx::query("UPDATE blogs SET image = $1 WHERE id = $2")
        .bind(&key)
        .bind(blog_id)
        .execute(pool)
        .await
        .unwrap();
    path
}

/// Installs the permission catalog.
pub async fn seed_permissions(pool: &PgPool) {
    for p in ALL {
        sqlx::query(
            "INSERT INTO permissions (name, slug, module) VALUES ($1, $2, $3)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(p.name)
        .bind(p.slug)
        .bind(p.module)
        .execute(pool)
        .await
        .unwrap();
    }
}

/// Creates (or reuses) a role granted exactly `permissions`.
pub async fn create_role(pool: &PgPool, slug: &str, permissions: &[&str]) -> i64 {
    let role_id: i64 = sqlx::query_scalar(
        "INSERT INTO roles (name, slug) VALUES ($1, $1)
         ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(slug)
    .fetch_one(pool)
    .await
    .unwrap();

    let slugs: Vec<String> = permissions.iter().map(|s| s.to_string()).collect();
    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
         SELECT $1, id FROM permissions WHERE slug = ANY($2)
         ON CONFLICT DO NOTHING",
    )
    .bind(role_id)
    .bind(&slugs)
    .execute(pool)
    .await
    .unwrap();

    role_id
}

/// Creates a user holding the given roles.
pub async fn create_user(pool: &PgPool, email: &str, role_ids: &[i64]) -> i64 {
    let hashed = hash_password(PASSWORD).unwrap();
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind("Test User")
    .bind(email)
    .bind(hashed)
    .fetch_one(pool)
    .await
    .unwrap();

    for role_id in role_ids {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role_id)
            .execute(pool)
            .await
            .unwrap();
    }
    user_id
}

pub async fn create_superadmin(pool: &PgPool, email: &str) -> i64 {
    seed_permissions(pool).await;
    let role = create_role(pool, SUPERADMIN_ROLE, &[]).await;
    create_user(pool, email, &[role]).await
}

pub async fn create_category(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO categories (name, slug) VALUES ($1, lower(replace($1, ' ', '-'))) RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Inserts a blog directly, appended to the display order.
pub async fn create_blog(pool: &PgPool, title: &str, category_id: i64, user_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO blogs (title, slug, content, status, tags, category_id, user_id, sort_order,
             priority, skills)
         VALUES ($1, lower(replace($1, ' ', '-')), 'Body', 'draft', ARRAY[]::TEXT[], $2, $3,
             (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM blogs), 'medium', ARRAY[]::TEXT[])
         RETURNING id",
    )
    .bind(title)
    .bind(category_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            serde_json::json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}
