//! # Quillboard Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`database`]: Connection string and pool size
//! - [`jwt`]: JWT authentication configuration
//! - [`server`]: Bind address and metrics toggle
//! - [`storage`]: Upload directory, public URL prefix and size ceiling
//!
//! Missing or unparsable variables fall back to defaults, except
//! `DATABASE_URL` which has none.
//!
//! # Example
//!
//! ```ignore
//! use quillboard_config::{CorsConfig, JwtConfig, StorageConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;
pub mod storage;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

pub(crate) fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
