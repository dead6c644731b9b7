//! # Quillboard Core
//!
//! Core types, errors, and utilities shared by every Quillboard crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination parameters and metadata
//! - [`permissions`]: Permission slug constants and the privileged role slug
//! - [`password`]: Password hashing and verification
//! - [`slug`]: URL-safe slug generation and shape checks
//! - [`file_storage`]: Storage abstraction for uploaded images
//! - [`serde`]: Query-string friendly deserializers
//!
//! # Example
//!
//! ```ignore
//! use quillboard_core::errors::AppError;
//! use quillboard_core::pagination::{PageParams, PageMeta};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Blog not found"));
//!
//! let params = PageParams::default();
//! let meta = PageMeta::new(&params, 42);
//! assert_eq!(meta.last_page, 5);
//! ```

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod permissions;
pub mod serde;
pub mod slug;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{Page, PageMeta, PageParams};
pub use password::{hash_password, verify_password};
