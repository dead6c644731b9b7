//! Fake blog generation and insertion.

use std::time::Instant;

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::lorem::en::{Paragraphs, Sentence, Words};
use quillboard_core::slug::generate_slug;
use quillboard_db::ordering::next_sort_order;
use quillboard_models::{Blog, BlogStatus, CategoryId, Priority, UserId};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::models::{BlogSeed, Location};

pub const SKILLS: &[&str] = &[
    "rust", "sql", "writing", "design", "marketing", "research", "editing", "seo",
];

// 16 bind parameters per row keeps a chunk well under the protocol limit.
const BATCH_SIZE: usize = 1000;

/// Generates blogs in parallel. Positions start at `first_sort_order` and
/// slugs carry the position so a batch never collides with itself.
pub fn generate_blogs(
    count: usize,
    first_sort_order: i32,
    author: UserId,
    categories: &[CategoryId],
    locations: &[Location],
) -> Vec<BlogSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = rand::thread_rng();
            let sort_order = first_sort_order + i as i32;

            let words: Vec<String> = Words(3..7).fake();
            let title = capitalise(&words.join(" "));
            let paragraphs: Vec<String> = Paragraphs(3..6).fake();
            let tags: Vec<String> = Words(0..4).fake();
            let skill_count = rng.gen_range(1..=3);
            let skills = SKILLS
                .choose_multiple(&mut rng, skill_count)
                .map(|s| s.to_string())
                .collect();
            let status = *BlogStatus::ALL.choose(&mut rng).unwrap_or(&BlogStatus::Draft);

            BlogSeed {
                slug: format!("{}-{}", generate_slug(&title), sort_order),
                title,
                content: paragraphs.join("\n\n"),
                status,
                tags,
                category_id: categories.choose(&mut rng).copied().unwrap_or(CategoryId(1)),
                user_id: author,
                sort_order,
                location: locations.choose(&mut rng).copied(),
                priority: *Priority::ALL.choose(&mut rng).unwrap_or(&Priority::Medium),
                is_featured: rng.gen_bool(0.2),
                skills,
                publish_date: Some(
                    Utc::now().date_naive() + Duration::days(rng.gen_range(0..60)),
                ),
                is_active: rng.gen_bool(0.9),
            }
        })
        .collect()
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => Sentence(3..5).fake(),
    }
}

/// Seeds `count` blogs appended after the current last position.
pub async fn seed_blogs(
    db: &PgPool,
    count: usize,
    author: UserId,
    categories: &[CategoryId],
    locations: &[Location],
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📝 Seeding {} blogs...", count);

    if categories.is_empty() {
        return Err("No categories found. Run `seed-lookups` first.".into());
    }

    let first = next_sort_order::<Blog>(db).await?;
    let blogs = generate_blogs(count, first, author, categories, locations);

    let mut tx = db.begin().await?;
    for chunk in blogs.chunks(BATCH_SIZE) {
        insert_blogs_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} blogs in {:?}",
        blogs.len(),
        start_time.elapsed()
    );
    Ok(blogs.len())
}

async fn insert_blogs_chunk(
    tx: &mut Transaction<'_, Postgres>,
    blogs: &[BlogSeed],
) -> Result<(), sqlx::Error> {
    if blogs.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO blogs (title, slug, content, status, tags, category_id, user_id, sort_order, \
         country_id, state_id, city_id, priority, is_featured, skills, publish_date, is_active) ",
    );
    qb.push_values(blogs, |mut row, blog| {
        row.push_bind(&blog.title)
            .push_bind(&blog.slug)
            .push_bind(&blog.content)
            .push_bind(blog.status)
            .push_bind(&blog.tags)
            .push_bind(blog.category_id)
            .push_bind(blog.user_id)
            .push_bind(blog.sort_order)
            .push_bind(blog.location.map(|l| l.country_id))
            .push_bind(blog.location.map(|l| l.state_id))
            .push_bind(blog.location.map(|l| l.city_id))
            .push_bind(blog.priority)
            .push_bind(blog.is_featured)
            .push_bind(&blog.skills)
            .push_bind(blog.publish_date)
            .push_bind(blog.is_active);
    });
    qb.build().execute(&mut **tx).await?;
    Ok(())
}

/// Returns the id of the seed author, creating the account on first use.
pub async fn ensure_author(
    db: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;
    let id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (name, email, password) VALUES ($1, $2, $3)
         ON CONFLICT (email) DO UPDATE SET updated_at = NOW()
         RETURNING id",
    )
    .bind("Seed Editor")
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await?;

    super::rbac::assign_role(&mut tx, id, "editor").await?;
    tx.commit().await?;
    Ok(id)
}

/// Deletes every blog.
pub async fn clear_blogs(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing blogs...");

    let deleted = sqlx::query("DELETE FROM blogs")
        .execute(db)
        .await?
        .rows_affected();

    println!("   ✓ Deleted {} blogs in {:?}", deleted, start_time.elapsed());
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillboard_core::slug::is_valid_slug;
    use quillboard_models::{CityId, CountryId, StateId};
    use std::collections::HashSet;

    fn location() -> Location {
        Location {
            country_id: CountryId(1),
            state_id: StateId(2),
            city_id: CityId(3),
        }
    }

    #[test]
    fn test_generate_blogs_positions_and_slugs() {
        let blogs = generate_blogs(25, 11, UserId(1), &[CategoryId(4)], &[location()]);
        assert_eq!(blogs.len(), 25);

        let orders: Vec<i32> = blogs.iter().map(|b| b.sort_order).collect();
        assert_eq!(orders, (11..36).collect::<Vec<_>>());

        let slugs: HashSet<_> = blogs.iter().map(|b| b.slug.as_str()).collect();
        assert_eq!(slugs.len(), 25);
        assert!(blogs.iter().all(|b| is_valid_slug(&b.slug)));
    }

    #[test]
    fn test_generated_blogs_satisfy_content_rules() {
        for blog in generate_blogs(20, 1, UserId(1), &[CategoryId(4)], &[location()]) {
            assert!(blog.tags.len() <= 10);
            assert!(!blog.skills.is_empty() && blog.skills.len() <= 3);
            assert_eq!(blog.category_id, CategoryId(4));
            assert_eq!(blog.location.map(|l| l.city_id), Some(CityId(3)));
            assert!(blog.publish_date.unwrap() >= Utc::now().date_naive());
        }
    }

    #[test]
    fn test_generate_without_locations() {
        let blogs = generate_blogs(3, 1, UserId(1), &[CategoryId(1)], &[]);
        assert!(blogs.iter().all(|b| b.location.is_none()));
    }
}
