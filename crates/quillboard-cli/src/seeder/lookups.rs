//! Categories, the country → state → city chain and the course → subject chain.
//!
//! The data is fixed rather than faked so the dependent dropdowns show
//! recognisable names.

use std::time::Instant;

use quillboard_core::slug::generate_slug;
use quillboard_models::{CategoryId, CityId, CountryId, StateId};
use sqlx::{PgPool, Postgres, Transaction};

use super::models::Location;

pub const CATEGORIES: &[(&str, &str)] = &[
    ("Technology", "Software, hardware and the people who build them"),
    ("Business", "Companies, markets and strategy"),
    ("Lifestyle", "Everyday living"),
    ("Travel", "Places and how to get there"),
    ("Health", "Fitness, nutrition and wellbeing"),
    ("Education", "Learning and teaching"),
];

type Cities = &'static [&'static str];
type States = &'static [(&'static str, Cities)];

pub const LOCATIONS: &[(&str, States)] = &[
    (
        "Canada",
        &[
            ("Ontario", &["Toronto", "Ottawa", "Hamilton"]),
            ("Quebec", &["Montreal", "Quebec City"]),
            ("British Columbia", &["Vancouver", "Victoria"]),
        ],
    ),
    (
        "United States",
        &[
            ("California", &["Los Angeles", "San Francisco", "San Diego"]),
            ("New York", &["New York City", "Buffalo"]),
            ("Texas", &["Austin", "Houston", "Dallas"]),
        ],
    ),
    (
        "Nigeria",
        &[
            ("Lagos", &["Ikeja", "Lekki", "Epe"]),
            ("Oyo", &["Ibadan", "Ogbomosho"]),
        ],
    ),
    (
        "Germany",
        &[
            ("Bavaria", &["Munich", "Nuremberg"]),
            ("Berlin", &["Berlin"]),
        ],
    ),
];

pub const COURSES: &[(&str, &[&str])] = &[
    ("Computer Science", &["Algorithms", "Databases", "Operating Systems", "Networks"]),
    ("Mathematics", &["Calculus", "Linear Algebra", "Statistics"]),
    ("Business Administration", &["Accounting", "Marketing", "Finance"]),
    ("Design", &["Typography", "Interaction Design"]),
];

pub async fn seed_categories(db: &PgPool) -> Result<Vec<CategoryId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗂️  Seeding {} categories...", CATEGORIES.len());

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let id = sqlx::query_scalar::<_, CategoryId>(
            "INSERT INTO categories (name, slug, description) VALUES ($1, $2, $3)
             ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(*name)
        .bind(generate_slug(name))
        .bind(*description)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }
    tx.commit().await?;

    println!("   ✓ Categories ready in {:?}", start_time.elapsed());
    Ok(ids)
}

async fn upsert_country(tx: &mut Transaction<'_, Postgres>, name: &str) -> Result<CountryId, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO countries (name) VALUES ($1)
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(name)
    .fetch_one(&mut **tx)
    .await
}

async fn upsert_state(
    tx: &mut Transaction<'_, Postgres>,
    country_id: CountryId,
    name: &str,
) -> Result<StateId, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO states (country_id, name) VALUES ($1, $2)
         ON CONFLICT (country_id, name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(country_id)
    .bind(name)
    .fetch_one(&mut **tx)
    .await
}

async fn upsert_city(
    tx: &mut Transaction<'_, Postgres>,
    state_id: StateId,
    name: &str,
) -> Result<CityId, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO cities (state_id, name) VALUES ($1, $2)
         ON CONFLICT (state_id, name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id",
    )
    .bind(state_id)
    .bind(name)
    .fetch_one(&mut **tx)
    .await
}

/// Seeds every country, state and city. Returns one entry per city.
pub async fn seed_locations(db: &PgPool) -> Result<Vec<Location>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌍 Seeding {} countries with states and cities...", LOCATIONS.len());

    let mut tx = db.begin().await?;
    let mut locations = Vec::new();
    for (country, states) in LOCATIONS {
        let country_id = upsert_country(&mut tx, country).await?;
        for (state, cities) in *states {
            let state_id = upsert_state(&mut tx, country_id, state).await?;
            for city in *cities {
                let city_id = upsert_city(&mut tx, state_id, city).await?;
                locations.push(Location {
                    country_id,
                    state_id,
                    city_id,
                });
            }
        }
    }
    tx.commit().await?;

    println!(
        "   ✓ {} cities ready in {:?}",
        locations.len(),
        start_time.elapsed()
    );
    Ok(locations)
}

pub async fn seed_courses(db: &PgPool) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} courses with subjects...", COURSES.len());

    let mut tx = db.begin().await?;
    let mut subjects = 0;
    for (course, names) in COURSES {
        let course_id: i64 = sqlx::query_scalar(
            "INSERT INTO courses (name) VALUES ($1)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id",
        )
        .bind(*course)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO subjects (course_id, name)
             SELECT $1, UNNEST($2::TEXT[])
             ON CONFLICT (course_id, name) DO NOTHING",
        )
        .bind(course_id)
        .bind(*names)
        .execute(&mut *tx)
        .await?;
        subjects += names.len();
    }
    tx.commit().await?;

    println!("   ✓ {} subjects ready in {:?}", subjects, start_time.elapsed());
    Ok(subjects)
}
