//! Role management. Each role owns its permission assignments, which are
//! replaced wholesale from the id list in create and update payloads.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_roles_router;
