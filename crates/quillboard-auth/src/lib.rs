//! # Quillboard Auth
//!
//! Authentication tokens and the permission evaluator.
//!
//! - [`claims`]: JWT claim structure for access tokens
//! - [`jwt`]: Token creation and verification
//! - [`evaluator`]: Whether an actor may perform an action
//!
//! Tokens identify the user and nothing else. Roles and permission grants are
//! loaded fresh for each request and handed to the evaluator, so a changed
//! assignment takes effect on the next request.
//!
//! # Example
//!
//! ```ignore
//! use quillboard_auth::{create_access_token, verify_token, evaluator};
//!
//! let token = create_access_token(user.id, &user.email, &jwt_config)?;
//! let claims = verify_token(&token, &jwt_config)?;
//!
//! let actor = load_actor(&db, claims.user_id()?).await?;
//! if evaluator::has_permission(&actor, permissions::BLOGS_EDIT) {
//!     // ...
//! }
//! ```

pub mod claims;
pub mod evaluator;
pub mod jwt;

pub use claims::Claims;
pub use evaluator::{Actor, ActorRole, PermissionGrant, effective_permission_slugs, has_permission};
pub use jwt::{create_access_token, verify_token};
