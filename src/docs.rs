use quillboard_core::PageMeta;
use quillboard_models::{
    Blog, BlogResponse, BlogStatus, BulkDeleteDto, BulkDeleteResponse, Category, CreateBlogDto,
    CreatePermissionDto, CreateRoleDto, CurrentUserResponse, LoginRequest, LoginResponse,
    MessageResponse, MoveBlogDto, OptionItem, PaginatedBlogsResponse, PaginatedPermissionsResponse,
    PaginatedRolesResponse, Permission, PermissionModule, PermissionModulesResponse, Priority,
    ReorderBlogsDto, Role, RoleWithPermissions, User,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_current_user,
        crate::modules::blogs::controller::get_blogs,
        crate::modules::blogs::controller::get_blog,
        crate::modules::blogs::controller::create_blog,
        crate::modules::blogs::controller::update_blog,
        crate::modules::blogs::controller::delete_blog,
        crate::modules::blogs::controller::bulk_delete_blogs,
        crate::modules::blogs::controller::upload_image,
        crate::modules::blogs::controller::reorder_blogs,
        crate::modules::blogs::controller::move_blog,
        crate::modules::blogs::controller::reset_blog_order,
        crate::modules::blogs::controller::export_blogs,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::roles::controller::bulk_delete_roles,
        crate::modules::permissions::controller::get_permissions,
        crate::modules::permissions::controller::get_permission_modules,
        crate::modules::permissions::controller::get_permission,
        crate::modules::permissions::controller::create_permission,
        crate::modules::permissions::controller::update_permission,
        crate::modules::permissions::controller::delete_permission,
        crate::modules::permissions::controller::bulk_delete_permissions,
        crate::modules::categories::controller::get_categories,
        crate::modules::locations::controller::get_countries,
        crate::modules::locations::controller::get_states,
        crate::modules::locations::controller::get_cities,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_subjects,
    ),
    components(
        schemas(
            User,
            LoginRequest,
            LoginResponse,
            CurrentUserResponse,
            ErrorResponse,
            MessageResponse,
            PageMeta,
            Blog,
            BlogStatus,
            Priority,
            BlogResponse,
            CreateBlogDto,
            PaginatedBlogsResponse,
            ReorderBlogsDto,
            MoveBlogDto,
            BulkDeleteDto,
            BulkDeleteResponse,
            Role,
            RoleWithPermissions,
            CreateRoleDto,
            PaginatedRolesResponse,
            Permission,
            CreatePermissionDto,
            PaginatedPermissionsResponse,
            PermissionModule,
            PermissionModulesResponse,
            Category,
            OptionItem,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and the current session"),
        (name = "Blogs", description = "Blog management, ordering and export"),
        (name = "Roles", description = "Roles and their permission assignments"),
        (name = "Permissions", description = "Permission catalog grouped by module"),
        (name = "Lookups", description = "Categories and dependent option lists")
    ),
    info(
        title = "Quillboard API",
        version = "0.1.0",
        description = "Content administration API with role-based access control, built with Axum and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_module() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/auth/login",
            "/api/blogs",
            "/api/blogs/{id}/image",
            "/api/blogs/reorder/move",
            "/api/roles/{id}",
            "/api/permissions/modules",
            "/api/countries/{id}/states",
            "/api/courses/{id}/subjects",
        ] {
            assert!(paths.iter().any(|p| *p == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
