//! # Quillboard DB
//!
//! Database pool, migrations, and the generic data access layer shared by
//! every resource.
//!
//! - [`repository`]: paginated, filterable, sortable listing plus generic
//!   lookups and deletes over any [`Resource`]
//! - [`ordering`]: the explicit `sort_order` sequence of [`Orderable`]
//!   collections
//!
//! # Example
//!
//! ```ignore
//! use quillboard_db::{init_db_pool, repository};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! let page = repository::list::<Blog>(&pool, &query).await?;
//! ```

use quillboard_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub mod ordering;
pub mod repository;

pub use ordering::{Orderable, OrderingError};
pub use repository::{FilterValue, ListQuery, Resource, SortDirection};
// Re-export PgPool for convenience
pub use sqlx::PgPool;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Connects to PostgreSQL and applies pending migrations.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!(max_connections = config.max_connections, "Database pool ready");

    Ok(pool)
}

/// True when `err` is a unique constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// True when `err` is a foreign key violation.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
