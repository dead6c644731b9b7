//! # Quillboard Models
//!
//! Domain records, request DTOs and response envelopes.
//!
//! - [`ids`]: typed `i64` keys per entity
//! - [`blogs`]: blog records, status/priority values, list filters
//! - [`roles`]: roles, permissions and module grouping helpers
//! - [`lookups`]: categories and dependent option entries
//! - [`users`]: users and the login/session payloads

pub mod blogs;
pub mod ids;
pub mod lookups;
pub mod roles;
pub mod users;

pub use blogs::{
    Blog, BlogFilterParams, BlogResponse, BlogStatus, CreateBlogDto, ExportParams, MoveBlogDto,
    PaginatedBlogsResponse, Priority, ReorderBlogsDto, UpdateBlogDto,
};
pub use ids::{
    BlogId, CategoryId, CityId, CountryId, CourseId, PermissionId, RoleId, StateId, SubjectId,
    UserId,
};
pub use lookups::{Category, OptionItem};
pub use roles::{
    CreatePermissionDto, CreateRoleDto, PaginatedPermissionsResponse, PaginatedRolesResponse,
    Permission, PermissionFilterParams, PermissionModule, PermissionModulesResponse, Role,
    RoleFilterParams, RolePermissionRow, RoleWithPermissions, UpdatePermissionDto, UpdateRoleDto,
};
pub use users::{CurrentUserResponse, LoginRequest, LoginResponse, User, UserCredentials};

/// Request body for bulk deletes.
#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
pub struct BulkDeleteDto {
    pub ids: Vec<i64>,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
