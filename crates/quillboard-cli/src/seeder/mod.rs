//! Database seeding for development and demos.
//!
//! # Module Structure
//!
//! - [`rbac`] - Permissions, the four seeded roles and superadmin creation
//! - [`lookups`] - Categories, locations and courses
//! - [`blogs`] - Fake blog generation and insertion
//! - [`models`] - Seed records and configuration
//!
//! # Usage
//!
//! ```ignore
//! use quillboard_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&db, SeedConfig::new(100)).await?;
//! ```
//!
//! Every step is idempotent except blog insertion, which appends.

pub mod blogs;
pub mod lookups;
pub mod models;
pub mod rbac;

pub use models::SeedConfig;

use std::time::Instant;

use bcrypt::hash;
use quillboard_models::CategoryId;
use sqlx::PgPool;

use models::{DEFAULT_PASSWORD, Location};

/// Low bcrypt cost: seeded accounts are for local use only.
pub fn hash_seed_password() -> Result<String, bcrypt::BcryptError> {
    hash(DEFAULT_PASSWORD, 4)
}

/// Seeds roles, lookups, an editor account and `config.num_blogs` blogs.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Starting full database seeding...");

    rbac::seed_rbac(db).await?;
    let (categories, locations) = seed_lookups(db).await?;

    let password_hash = hash_seed_password()?;
    let author = blogs::ensure_author(db, &config.author_email, &password_hash).await?;
    let created = blogs::seed_blogs(db, config.num_blogs, author, &categories, &locations).await?;

    println!(
        "\n✅ Seeding complete! Created {} blogs in {:?}",
        created,
        start_time.elapsed()
    );
    println!("\n📝 {} can sign in with password: {}", config.author_email, DEFAULT_PASSWORD);
    Ok(())
}

/// Seeds categories, locations and courses.
pub async fn seed_lookups(
    db: &PgPool,
) -> Result<(Vec<CategoryId>, Vec<Location>), Box<dyn std::error::Error>> {
    let categories = lookups::seed_categories(db).await?;
    let locations = lookups::seed_locations(db).await?;
    lookups::seed_courses(db).await?;
    Ok((categories, locations))
}

/// Appends blogs using whatever categories and cities already exist.
pub async fn seed_blogs_only(
    db: &PgPool,
    config: SeedConfig,
) -> Result<usize, Box<dyn std::error::Error>> {
    let categories: Vec<CategoryId> =
        sqlx::query_scalar("SELECT id FROM categories WHERE is_active ORDER BY id")
            .fetch_all(db)
            .await?;
    let locations = existing_locations(db).await?;

    let password_hash = hash_seed_password()?;
    let author = blogs::ensure_author(db, &config.author_email, &password_hash).await?;
    blogs::seed_blogs(db, config.num_blogs, author, &categories, &locations).await
}

async fn existing_locations(db: &PgPool) -> Result<Vec<Location>, sqlx::Error> {
    let rows: Vec<(i64, i64, i64)> = sqlx::query_as(
        "SELECT s.country_id, c.state_id, c.id
         FROM cities c JOIN states s ON s.id = c.state_id
         ORDER BY c.id",
    )
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(country_id, state_id, city_id)| Location {
            country_id: country_id.into(),
            state_id: state_id.into(),
            city_id: city_id.into(),
        })
        .collect())
}

/// Clears blogs. Roles, permissions, users and lookups are kept.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    blogs::clear_blogs(db).await?;
    println!("\n✅ Seeded content cleared");
    Ok(())
}
