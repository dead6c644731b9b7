//! # Quillboard CLI
//!
//! Administrative commands and database seeding for Quillboard development.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use quillboard_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(50); // 50 blogs plus roles and lookups
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
