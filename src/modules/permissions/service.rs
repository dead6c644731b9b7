use anyhow::anyhow;
use quillboard_core::{AppError, PageParams};
use quillboard_db::{ListQuery, Resource, is_unique_violation, repository};
use quillboard_models::roles::{filter_by_module, group_by_module, unique_modules};
use quillboard_models::{
    CreatePermissionDto, PaginatedPermissionsResponse, Permission, PermissionFilterParams,
    PermissionId, PermissionModulesResponse, UpdatePermissionDto,
};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::metrics::track_records_deleted;

pub fn list_query(params: PermissionFilterParams) -> ListQuery {
    let module = params.module_filter().map(str::to_string);
    ListQuery::new(PageParams {
        page: params.page,
        per_page: params.per_page,
    })
    .search(params.search)
    .filter("module", module)
    .filter("is_active", params.is_active)
    .sort(params.sort_by, params.sort_order)
}

/// Trimmed module label; blank labels are stored as no module.
pub fn normalize_module(module: Option<&str>) -> Option<String> {
    module
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Every module label plus the grouped view, optionally narrowed to one
/// module (`all` keeps everything).
pub fn modules_overview(
    permissions: Vec<Permission>,
    module: Option<&str>,
) -> PermissionModulesResponse {
    let modules = unique_modules(&permissions);
    let selected = match module {
        Some(module) => filter_by_module(&permissions, module)
            .into_iter()
            .cloned()
            .collect(),
        None => permissions,
    };

    PermissionModulesResponse {
        modules,
        groups: group_by_module(selected),
    }
}

fn write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        return AppError::bad_request(anyhow!("A permission with this slug already exists"));
    }
    AppError::from(err)
}

async fn find_permission(db: &PgPool, id: PermissionId) -> Result<Permission, AppError> {
    repository::find::<Permission>(db, id.get())
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Permission not found")))
}

#[instrument(skip(db))]
pub async fn get_permissions(
    db: &PgPool,
    params: PermissionFilterParams,
) -> Result<PaginatedPermissionsResponse, AppError> {
    let page = repository::list::<Permission>(db, &list_query(params)).await?;
    Ok(PaginatedPermissionsResponse {
        data: page.data,
        meta: page.meta,
    })
}

#[instrument(skip(db))]
pub async fn get_permission(db: &PgPool, id: PermissionId) -> Result<Permission, AppError> {
    find_permission(db, id).await
}

#[instrument(skip(db))]
pub async fn get_modules(
    db: &PgPool,
    module: Option<&str>,
) -> Result<PermissionModulesResponse, AppError> {
    let permissions: Vec<Permission> =
        sqlx::query_as("SELECT * FROM permissions ORDER BY module NULLS LAST, name")
            .fetch_all(db)
            .await?;
    Ok(modules_overview(permissions, module))
}

#[instrument(skip(db, dto), fields(slug = %dto.slug))]
pub async fn create_permission(
    db: &PgPool,
    dto: CreatePermissionDto,
) -> Result<Permission, AppError> {
    let id = sqlx::query_scalar::<_, PermissionId>(
        "INSERT INTO permissions (name, slug, module, description, is_active)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(dto.name.trim())
    .bind(dto.slug.trim())
    .bind(normalize_module(dto.module.as_deref()))
    .bind(&dto.description)
    .bind(dto.is_active)
    .fetch_one(db)
    .await
    .map_err(write_error)?;

    info!(permission_id = %id, "Permission created");
    find_permission(db, id).await
}

#[instrument(skip(db, dto), fields(slug = %dto.slug))]
pub async fn update_permission(
    db: &PgPool,
    id: PermissionId,
    dto: UpdatePermissionDto,
) -> Result<Permission, AppError> {
    let updated = sqlx::query(
        "UPDATE permissions SET name = $1, slug = $2, module = $3, description = $4,
             is_active = $5, updated_at = NOW()
         WHERE id = $6",
    )
    .bind(dto.name.trim())
    .bind(dto.slug.trim())
    .bind(normalize_module(dto.module.as_deref()))
    .bind(&dto.description)
    .bind(dto.is_active)
    .bind(id)
    .execute(db)
    .await
    .map_err(write_error)?;

    if updated.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Permission not found")));
    }

    find_permission(db, id).await
}

/// Removes the permission and every role assignment of it.
#[instrument(skip(db))]
pub async fn delete_permission(db: &PgPool, id: PermissionId) -> Result<(), AppError> {
    if !repository::delete::<Permission>(db, id.get()).await? {
        return Err(AppError::not_found(anyhow!("Permission not found")));
    }
    track_records_deleted(Permission::TABLE, 1);
    Ok(())
}

#[instrument(skip(db, ids), fields(ids.count = ids.len()))]
pub async fn bulk_delete_permissions(db: &PgPool, ids: &[i64]) -> Result<u64, AppError> {
    let deleted = repository::bulk_delete::<Permission>(db, ids).await?;
    track_records_deleted(Permission::TABLE, deleted);
    Ok(deleted)
}
