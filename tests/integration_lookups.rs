mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_user, get_request, login, send, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

async fn seed_locations(pool: &PgPool) -> (i64, i64) {
    let country: i64 = sqlx::query_scalar("INSERT INTO countries (name) VALUES ('Canada') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO countries (name) VALUES ('Austria')")
        .execute(pool)
        .await
        .unwrap();
    let state: i64 = sqlx::query_scalar(
        "INSERT INTO states (country_id, name) VALUES ($1, 'Ontario') RETURNING id",
    )
    .bind(country)
    .fetch_one(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO states (country_id, name) VALUES ($1, 'Alberta')")
        .bind(country)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO cities (state_id, name) VALUES ($1, 'Toronto'), ($1, 'Ottawa')")
        .bind(state)
        .execute(pool)
        .await
        .unwrap();
    (country, state)
}

fn names(body: &serde_json::Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_location_chain(pool: PgPool) {
    let (country, state) = seed_locations(&pool).await;
    create_user(&pool, "plain@example.com", &[]).await;
    let app = setup_test_app(pool);
    let token = login(&app, "plain@example.com").await;

    let (status, body) = send(&app, get_request("/api/countries", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Austria", "Canada"]);

    let (_, body) = send(&app, get_request(&format!("/api/countries/{country}/states"), &token)).await;
    assert_eq!(names(&body), vec!["Alberta", "Ontario"]);

    let (_, body) = send(&app, get_request(&format!("/api/states/{state}/cities"), &token)).await;
    assert_eq!(names(&body), vec!["Ottawa", "Toronto"]);
    assert!(body[0]["id"].is_i64());

    let (status, body) = send(&app, get_request("/api/countries/424242/states", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_courses_and_subjects(pool: PgPool) {
    let course: i64 = sqlx::query_scalar("INSERT INTO courses (name) VALUES ('Science') RETURNING id")
        .fetch_one(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO subjects (course_id, name) VALUES ($1, 'Physics'), ($1, 'Biology')")
        .bind(course)
        .execute(&pool)
        .await
        .unwrap();
    create_user(&pool, "plain@example.com", &[]).await;
    let app = setup_test_app(pool);
    let token = login(&app, "plain@example.com").await;

    let (_, body) = send(&app, get_request("/api/courses", &token)).await;
    assert_eq!(names(&body), vec!["Science"]);

    let (_, body) = send(&app, get_request(&format!("/api/courses/{course}/subjects"), &token)).await;
    assert_eq!(names(&body), vec!["Biology", "Physics"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_categories_only_active(pool: PgPool) {
    sqlx::query(
        "INSERT INTO categories (name, slug, is_active) VALUES
            ('Tech', 'tech', TRUE), ('Archive', 'archive', FALSE), ('Art', 'art', TRUE)",
    )
    .execute(&pool)
    .await
    .unwrap();
    create_user(&pool, "plain@example.com", &[]).await;
    let app = setup_test_app(pool);
    let token = login(&app, "plain@example.com").await;

    let (status, body) = send(&app, get_request("/api/categories", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Art", "Tech"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lookups_require_authentication(pool: PgPool) {
    let app = setup_test_app(pool);
    let request = Request::builder()
        .uri("/api/countries")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
