//! Course and subject option lists, the second dependent chain offered to
//! forms.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_courses_router;
