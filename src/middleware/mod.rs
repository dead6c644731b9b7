//! Request extractors for authentication and authorization.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the token and loads the user's current
//!    roles and grants
//! 3. Permission extractors such as [`auth::RequireBlogsEdit`] answer 403
//!    before the handler runs when the grant is missing
//!
//! ```ignore
//! use crate::middleware::auth::RequireBlogsCreate;
//!
//! async fn create_blog(RequireBlogsCreate(auth_user): RequireBlogsCreate) -> impl IntoResponse {
//!     // only runs for actors holding `blogs.create`
//! }
//! ```

pub mod auth;
