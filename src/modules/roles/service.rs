use std::collections::{BTreeSet, HashMap};

use anyhow::anyhow;
use quillboard_core::{AppError, PageParams};
use quillboard_db::{ListQuery, Resource, is_unique_violation, repository};
use quillboard_models::{
    CreateRoleDto, PaginatedRolesResponse, PermissionId, Role, RoleFilterParams, RoleId,
    RolePermissionRow, RoleWithPermissions, UpdateRoleDto,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use crate::metrics::track_records_deleted;

pub fn list_query(params: RoleFilterParams) -> ListQuery {
    ListQuery::new(PageParams {
        page: params.page,
        per_page: params.per_page,
    })
    .search(params.search)
    .filter("is_active", params.is_active)
    .sort(params.sort_by, params.sort_order)
}

/// Pairs each role with its permissions, keeping the order of `roles`.
pub fn attach_permissions(
    roles: Vec<Role>,
    rows: Vec<RolePermissionRow>,
) -> Vec<RoleWithPermissions> {
    let mut by_role: HashMap<RoleId, Vec<_>> = HashMap::new();
    for row in rows {
        by_role.entry(row.role_id).or_default().push(row.permission);
    }

    roles
        .into_iter()
        .map(|role| {
            let permissions = by_role.remove(&role.id).unwrap_or_default();
            RoleWithPermissions { role, permissions }
        })
        .collect()
}

/// Requested ids that are not in `found`, deduplicated and sorted.
pub fn missing_ids(requested: &[PermissionId], found: &[PermissionId]) -> Vec<PermissionId> {
    let found: BTreeSet<_> = found.iter().copied().collect();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        return AppError::bad_request(anyhow!("A role with this slug already exists"));
    }
    AppError::from(err)
}

async fn permission_rows(
    db: &PgPool,
    role_ids: &[RoleId],
) -> Result<Vec<RolePermissionRow>, sqlx::Error> {
    sqlx::query_as::<_, RolePermissionRow>(
        "SELECT rp.role_id, p.*
         FROM role_permissions rp
         JOIN permissions p ON p.id = rp.permission_id
         WHERE rp.role_id = ANY($1)
         ORDER BY p.module NULLS LAST, p.name",
    )
    .bind(role_ids)
    .fetch_all(db)
    .await
}

async fn check_permission_ids(db: &PgPool, ids: &[PermissionId]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: Vec<PermissionId> =
        sqlx::query_scalar("SELECT id FROM permissions WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(db)
            .await?;

    let missing = missing_ids(ids, &found);
    if !missing.is_empty() {
        let listed: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(AppError::field(
            "permissions",
            format!("Selected permissions do not exist: {}", listed.join(", ")),
        ));
    }
    Ok(())
}

/// Replaces the role's permission set with `ids`.
async fn sync_permissions(
    tx: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
    ids: &[PermissionId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut **tx)
        .await?;

    if !ids.is_empty() {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(ids)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[instrument(skip(db))]
pub async fn get_roles(
    db: &PgPool,
    params: RoleFilterParams,
) -> Result<PaginatedRolesResponse, AppError> {
    let page = repository::list::<Role>(db, &list_query(params)).await?;
    let ids: Vec<RoleId> = page.data.iter().map(|r| r.id).collect();
    let rows = permission_rows(db, &ids).await?;

    Ok(PaginatedRolesResponse {
        data: attach_permissions(page.data, rows),
        meta: page.meta,
    })
}

#[instrument(skip(db))]
pub async fn get_role(db: &PgPool, id: RoleId) -> Result<RoleWithPermissions, AppError> {
    let role = repository::find::<Role>(db, id.get())
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))?;
    let rows = permission_rows(db, &[id]).await?;

    attach_permissions(vec![role], rows)
        .pop()
        .ok_or_else(|| AppError::internal_error("Role vanished while loading".to_string()))
}

#[instrument(skip(db, dto), fields(slug = %dto.slug))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<RoleWithPermissions, AppError> {
    let permissions = dto.permissions.unwrap_or_default();
    check_permission_ids(db, &permissions).await?;

    let mut tx = db.begin().await?;

    let id = sqlx::query_scalar::<_, RoleId>(
        "INSERT INTO roles (name, slug, description, is_active)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(dto.name.trim())
    .bind(dto.slug.trim())
    .bind(&dto.description)
    .bind(dto.is_active)
    .fetch_one(&mut *tx)
    .await
    .map_err(write_error)?;

    sync_permissions(&mut tx, id, &permissions).await?;
    tx.commit().await?;

    info!(role_id = %id, permissions = permissions.len(), "Role created");
    get_role(db, id).await
}

/// Updates the role's fields. Permissions are replaced only when the payload
/// lists them.
#[instrument(skip(db, dto), fields(slug = %dto.slug))]
pub async fn update_role(
    db: &PgPool,
    id: RoleId,
    dto: UpdateRoleDto,
) -> Result<RoleWithPermissions, AppError> {
    if let Some(permissions) = &dto.permissions {
        check_permission_ids(db, permissions).await?;
    }

    let mut tx = db.begin().await?;

    let updated = sqlx::query(
        "UPDATE roles SET name = $1, slug = $2, description = $3, is_active = $4,
             updated_at = NOW()
         WHERE id = $5",
    )
    .bind(dto.name.trim())
    .bind(dto.slug.trim())
    .bind(&dto.description)
    .bind(dto.is_active)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(write_error)?;

    if updated.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }

    if let Some(permissions) = &dto.permissions {
        sync_permissions(&mut tx, id, permissions).await?;
    }
    tx.commit().await?;

    get_role(db, id).await
}

/// Removes the role. Its permission and user assignments go with it; the
/// permissions themselves stay.
#[instrument(skip(db))]
pub async fn delete_role(db: &PgPool, id: RoleId) -> Result<(), AppError> {
    if !repository::delete::<Role>(db, id.get()).await? {
        return Err(AppError::not_found(anyhow!("Role not found")));
    }
    track_records_deleted(Role::TABLE, 1);
    info!(role_id = %id, "Role deleted");
    Ok(())
}

#[instrument(skip(db, ids), fields(ids.count = ids.len()))]
pub async fn bulk_delete_roles(db: &PgPool, ids: &[i64]) -> Result<u64, AppError> {
    let deleted = repository::bulk_delete::<Role>(db, ids).await?;
    track_records_deleted(Role::TABLE, deleted);
    Ok(deleted)
}
