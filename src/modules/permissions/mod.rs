//! Permission catalog. A permission's `module` is a free-text label used
//! only for grouping and filtering.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_permissions_router;
