//! Seed records and seeding configuration.

use chrono::NaiveDate;
use quillboard_models::{BlogStatus, CategoryId, CityId, CountryId, Priority, StateId, UserId};

/// Which permissions a seeded role receives.
#[derive(Debug, Clone, Copy)]
pub enum Grant {
    All,
    AllExceptModule(&'static str),
    Module(&'static str),
    Only(&'static [&'static str]),
}

impl Grant {
    pub fn includes(self, slug: &str, module: &str) -> bool {
        match self {
            Grant::All => true,
            Grant::AllExceptModule(excluded) => module != excluded,
            Grant::Module(included) => module == included,
            Grant::Only(slugs) => slugs.contains(&slug),
        }
    }
}

pub struct RoleSeed {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub grant: Grant,
}

/// A city with the state and country it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub country_id: CountryId,
    pub state_id: StateId,
    pub city_id: CityId,
}

/// Seed data for creating a blog.
pub struct BlogSeed {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: BlogStatus,
    pub tags: Vec<String>,
    pub category_id: CategoryId,
    pub user_id: UserId,
    pub sort_order: i32,
    pub location: Option<Location>,
    pub priority: Priority,
    pub is_featured: bool,
    pub skills: Vec<String>,
    pub publish_date: Option<NaiveDate>,
    pub is_active: bool,
}

/// Configuration for a full seeding run.
#[derive(Clone)]
pub struct SeedConfig {
    pub num_blogs: usize,
    pub author_email: String,
}

impl SeedConfig {
    pub fn new(num_blogs: usize) -> Self {
        Self {
            num_blogs,
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
        }
    }

    pub fn with_author(mut self, email: impl Into<String>) -> Self {
        self.author_email = email.into();
        self
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self::new(50)
    }
}

pub const DEFAULT_AUTHOR_EMAIL: &str = "editor@example.com";
pub const DEFAULT_PASSWORD: &str = "password123";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_includes() {
        assert!(Grant::All.includes("roles.view", "Roles"));
        assert!(!Grant::AllExceptModule("Roles").includes("roles.view", "Roles"));
        assert!(Grant::AllExceptModule("Roles").includes("blogs.view", "Blogs"));
        assert!(Grant::Module("Blogs").includes("blogs.delete", "Blogs"));
        assert!(!Grant::Module("Blogs").includes("users.view", "Users"));
        assert!(Grant::Only(&["blogs.view"]).includes("blogs.view", "Blogs"));
        assert!(!Grant::Only(&["blogs.view"]).includes("blogs.edit", "Blogs"));
    }

    #[test]
    fn test_seed_config_defaults() {
        let config = SeedConfig::default();
        assert_eq!(config.num_blogs, 50);
        assert_eq!(config.author_email, DEFAULT_AUTHOR_EMAIL);
        assert_eq!(SeedConfig::new(3).with_author("a@b.test").author_email, "a@b.test");
    }
}
