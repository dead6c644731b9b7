//! Role and permission domain models and DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quillboard_core::PageMeta;
use quillboard_core::serde::{
    deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string,
};
use quillboard_db::Resource;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{PermissionId, RoleId};

/// Module label used for permissions that carry none.
pub const GENERAL_MODULE: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub slug: String,
    /// Free-text grouping label
    pub module: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Permission {
    const TABLE: &'static str = "permissions";
    const ALIAS: &'static str = "p";
    const COLUMNS: &'static str = "p.*";
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "slug"];
    const FILTER_COLUMNS: &'static [&'static str] = &["module", "is_active"];
    const SORTABLE: &'static [&'static str] = &["name", "slug", "module", "created_at"];
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Role {
    const TABLE: &'static str = "roles";
    const ALIAS: &'static str = "r";
    const COLUMNS: &'static str = "r.*";
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "slug"];
    const FILTER_COLUMNS: &'static [&'static str] = &["is_active"];
    const SORTABLE: &'static [&'static str] = &["name", "slug", "is_active", "created_at"];
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Join row used to attach permissions to a page of roles.
#[derive(Debug, Clone, FromRow)]
pub struct RolePermissionRow {
    pub role_id: RoleId,
    #[sqlx(flatten)]
    pub permission: Permission,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(length(min = 1, max = 255, message = "Role name is required (max 255 characters)"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Role slug is required (max 255 characters)"))]
    pub slug: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Permission ids to sync onto the role; omitted leaves assignments as they are
    pub permissions: Option<Vec<PermissionId>>,
}

pub type UpdateRoleDto = CreateRoleDto;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionDto {
    #[validate(length(min = 1, max = 255, message = "Permission name is required (max 255 characters)"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Permission slug is required (max 255 characters)"))]
    pub slug: String,
    #[validate(length(max = 255, message = "Module must not exceed 255 characters"))]
    pub module: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

pub type UpdatePermissionDto = CreatePermissionDto;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sort_order: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermissionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    /// Exact module label; `all` means no module filter
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sort_order: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
}

impl PermissionFilterParams {
    /// The module filter with `all` treated as absent.
    pub fn module_filter(&self) -> Option<&str> {
        self.module
            .as_deref()
            .filter(|m| !m.eq_ignore_ascii_case("all"))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedRolesResponse {
    pub data: Vec<RoleWithPermissions>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedPermissionsResponse {
    pub data: Vec<Permission>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionModule {
    pub module: String,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionModulesResponse {
    /// Distinct non-empty module labels, sorted
    pub modules: Vec<String>,
    pub groups: Vec<PermissionModule>,
}

/// Distinct, non-empty module labels in sorted order.
pub fn unique_modules(permissions: &[Permission]) -> Vec<String> {
    let mut modules: Vec<String> = permissions
        .iter()
        .filter_map(|p| p.module.as_deref())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    modules.sort();
    modules.dedup();
    modules
}

/// Permissions whose module equals `module`; `all` keeps everything.
pub fn filter_by_module<'a>(permissions: &'a [Permission], module: &str) -> Vec<&'a Permission> {
    if module.eq_ignore_ascii_case("all") {
        return permissions.iter().collect();
    }
    permissions
        .iter()
        .filter(|p| p.module.as_deref() == Some(module))
        .collect()
}

/// Groups permissions by module label, with unlabelled ones under `General`.
pub fn group_by_module(permissions: Vec<Permission>) -> Vec<PermissionModule> {
    let mut groups: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
    for permission in permissions {
        let module = permission
            .module
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERAL_MODULE)
            .to_string();
        groups.entry(module).or_default().push(permission);
    }
    groups
        .into_iter()
        .map(|(module, permissions)| PermissionModule { module, permissions })
        .collect()
}
