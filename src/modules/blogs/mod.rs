//! Blog management: listing, CRUD, cover images, ordering and export.
//!
//! Blogs carry an explicit `sort_order`. New blogs go to the end; the
//! reorder endpoints rewrite positions through the ordering engine.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_blogs_router;
