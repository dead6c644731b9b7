use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use quillboard_core::AppError;
use quillboard_models::{
    BulkDeleteDto, BulkDeleteResponse, CreatePermissionDto, PaginatedPermissionsResponse,
    Permission, PermissionFilterParams, PermissionId, PermissionModulesResponse,
    UpdatePermissionDto,
};
use tracing::instrument;

use super::service;
use crate::middleware::auth::{
    RequirePermissionsCreate, RequirePermissionsDelete, RequirePermissionsEdit,
    RequirePermissionsView,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/permissions",
    params(PermissionFilterParams),
    responses(
        (status = 200, description = "Page of permissions", body = PaginatedPermissionsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires permissions.view")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_permissions(
    State(state): State<AppState>,
    _auth: RequirePermissionsView,
    Query(params): Query<PermissionFilterParams>,
) -> Result<Json<PaginatedPermissionsResponse>, AppError> {
    let permissions = service::get_permissions(&state.db, params).await?;
    Ok(Json(permissions))
}

/// Module labels and the grouped catalog
///
/// `module` narrows the groups; the label list always covers every module.
#[utoipa::path(
    get,
    path = "/api/permissions/modules",
    params(("module" = Option<String>, Query, description = "Module label, or `all`")),
    responses(
        (status = 200, description = "Module labels and grouped permissions", body = PermissionModulesResponse),
        (status = 403, description = "Forbidden - requires permissions.view")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_permission_modules(
    State(state): State<AppState>,
    _auth: RequirePermissionsView,
    Query(params): Query<PermissionFilterParams>,
) -> Result<Json<PermissionModulesResponse>, AppError> {
    let overview = service::get_modules(&state.db, params.module.as_deref()).await?;
    Ok(Json(overview))
}

#[utoipa::path(
    get,
    path = "/api/permissions/{id}",
    params(("id" = i64, Path, description = "Permission ID")),
    responses(
        (status = 200, description = "Permission details", body = Permission),
        (status = 403, description = "Forbidden - requires permissions.view"),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_permission(
    State(state): State<AppState>,
    _auth: RequirePermissionsView,
    Path(id): Path<PermissionId>,
) -> Result<Json<Permission>, AppError> {
    let permission = service::get_permission(&state.db, id).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    post,
    path = "/api/permissions",
    request_body = CreatePermissionDto,
    responses(
        (status = 201, description = "Permission created", body = Permission),
        (status = 400, description = "Slug already taken"),
        (status = 403, description = "Forbidden - requires permissions.create"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn create_permission(
    State(state): State<AppState>,
    _auth: RequirePermissionsCreate,
    ValidatedJson(dto): ValidatedJson<CreatePermissionDto>,
) -> Result<(StatusCode, Json<Permission>), AppError> {
    let permission = service::create_permission(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    put,
    path = "/api/permissions/{id}",
    params(("id" = i64, Path, description = "Permission ID")),
    request_body = UpdatePermissionDto,
    responses(
        (status = 200, description = "Permission updated", body = Permission),
        (status = 400, description = "Slug already taken"),
        (status = 403, description = "Forbidden - requires permissions.edit"),
        (status = 404, description = "Permission not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn update_permission(
    State(state): State<AppState>,
    _auth: RequirePermissionsEdit,
    Path(id): Path<PermissionId>,
    ValidatedJson(dto): ValidatedJson<UpdatePermissionDto>,
) -> Result<Json<Permission>, AppError> {
    let permission = service::update_permission(&state.db, id, dto).await?;
    Ok(Json(permission))
}

#[utoipa::path(
    delete,
    path = "/api/permissions/{id}",
    params(("id" = i64, Path, description = "Permission ID")),
    responses(
        (status = 204, description = "Permission deleted"),
        (status = 403, description = "Forbidden - requires permissions.delete"),
        (status = 404, description = "Permission not found")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn delete_permission(
    State(state): State<AppState>,
    _auth: RequirePermissionsDelete,
    Path(id): Path<PermissionId>,
) -> Result<StatusCode, AppError> {
    service::delete_permission(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/permissions/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Number of permissions deleted", body = BulkDeleteResponse),
        (status = 403, description = "Forbidden - requires permissions.delete")
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn bulk_delete_permissions(
    State(state): State<AppState>,
    _auth: RequirePermissionsDelete,
    Json(dto): Json<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = service::bulk_delete_permissions(&state.db, &dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
