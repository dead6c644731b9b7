//! Country, state and city option lists.
//!
//! Each list is `{id, name}` ordered by name. A parent that does not exist
//! yields an empty list, the same as a parent without children, so that a
//! dependent field simply has nothing to offer.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_locations_router;
