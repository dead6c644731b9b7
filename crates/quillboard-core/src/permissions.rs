//! Permission slug constants.
//!
//! Permissions are rows in the `permissions` table, not a compiled enum: roles
//! and their grants change at runtime. These constants name the slugs the
//! HTTP surface checks and the seeder creates.
//!
//! # Example
//!
//! ```ignore
//! use quillboard_core::permissions;
//!
//! if has_permission(&actor, permissions::BLOGS_CREATE) {
//!     // show the "New blog" button
//! }
//! ```

/// Holders of this role pass every permission check.
pub const SUPERADMIN_ROLE: &str = "superadmin";

// =============================================================================
// Users permissions
// =============================================================================

pub const USERS_VIEW: &str = "users.view";
pub const USERS_CREATE: &str = "users.create";
pub const USERS_EDIT: &str = "users.edit";
pub const USERS_DELETE: &str = "users.delete";

// =============================================================================
// Blogs permissions
// =============================================================================

pub const BLOGS_VIEW: &str = "blogs.view";
pub const BLOGS_CREATE: &str = "blogs.create";
pub const BLOGS_EDIT: &str = "blogs.edit";
pub const BLOGS_DELETE: &str = "blogs.delete";

// =============================================================================
// Roles permissions
// =============================================================================

pub const ROLES_VIEW: &str = "roles.view";
pub const ROLES_CREATE: &str = "roles.create";
pub const ROLES_EDIT: &str = "roles.edit";
pub const ROLES_DELETE: &str = "roles.delete";

// =============================================================================
// Permissions permissions
// =============================================================================

pub const PERMISSIONS_VIEW: &str = "permissions.view";
pub const PERMISSIONS_CREATE: &str = "permissions.create";
pub const PERMISSIONS_EDIT: &str = "permissions.edit";
pub const PERMISSIONS_DELETE: &str = "permissions.delete";

/// A seeded permission: slug, display name, module label.
pub struct PermissionSeed {
    pub slug: &'static str,
    pub name: &'static str,
    pub module: &'static str,
}

const fn seed(slug: &'static str, name: &'static str, module: &'static str) -> PermissionSeed {
    PermissionSeed { slug, name, module }
}

/// Every permission the seeder installs, grouped by module.
pub const ALL: &[PermissionSeed] = &[
    seed(USERS_VIEW, "View Users", "Users"),
    seed(USERS_CREATE, "Create Users", "Users"),
    seed(USERS_EDIT, "Edit Users", "Users"),
    seed(USERS_DELETE, "Delete Users", "Users"),
    seed(BLOGS_VIEW, "View Blogs", "Blogs"),
    seed(BLOGS_CREATE, "Create Blogs", "Blogs"),
    seed(BLOGS_EDIT, "Edit Blogs", "Blogs"),
    seed(BLOGS_DELETE, "Delete Blogs", "Blogs"),
    seed(ROLES_VIEW, "View Roles", "Roles"),
    seed(ROLES_CREATE, "Create Roles", "Roles"),
    seed(ROLES_EDIT, "Edit Roles", "Roles"),
    seed(ROLES_DELETE, "Delete Roles", "Roles"),
    seed(PERMISSIONS_VIEW, "View Permissions", "Permissions"),
    seed(PERMISSIONS_CREATE, "Create Permissions", "Permissions"),
    seed(PERMISSIONS_EDIT, "Edit Permissions", "Permissions"),
    seed(PERMISSIONS_DELETE, "Delete Permissions", "Permissions"),
];
