pub mod auth;
pub mod blogs;
pub mod categories;
pub mod courses;
pub mod locations;
pub mod permissions;
pub mod roles;
