use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use quillboard_core::AppError;
use quillboard_models::{
    BulkDeleteDto, BulkDeleteResponse, CreateRoleDto, PaginatedRolesResponse, RoleFilterParams,
    RoleId, RoleWithPermissions, UpdateRoleDto,
};
use tracing::instrument;

use super::service;
use crate::middleware::auth::{
    RequireRolesCreate, RequireRolesDelete, RequireRolesEdit, RequireRolesView,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/roles",
    params(RoleFilterParams),
    responses(
        (status = 200, description = "Page of roles with their permissions", body = PaginatedRolesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires roles.view")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_roles(
    State(state): State<AppState>,
    _auth: RequireRolesView,
    Query(params): Query<RoleFilterParams>,
) -> Result<Json<PaginatedRolesResponse>, AppError> {
    let roles = service::get_roles(&state.db, params).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(("id" = i64, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role with its permissions", body = RoleWithPermissions),
        (status = 403, description = "Forbidden - requires roles.view"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    _auth: RequireRolesView,
    Path(id): Path<RoleId>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::get_role(&state.db, id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = RoleWithPermissions),
        (status = 400, description = "Slug already taken"),
        (status = 403, description = "Forbidden - requires roles.create"),
        (status = 422, description = "Validation failed or unknown permission ids")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn create_role(
    State(state): State<AppState>,
    _auth: RequireRolesCreate,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<RoleWithPermissions>), AppError> {
    let role = service::create_role(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// Update a role
///
/// Omitting `permissions` leaves the current assignments untouched; an empty
/// list clears them.
#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    params(("id" = i64, Path, description = "Role ID")),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = RoleWithPermissions),
        (status = 400, description = "Slug already taken"),
        (status = 403, description = "Forbidden - requires roles.edit"),
        (status = 404, description = "Role not found"),
        (status = 422, description = "Validation failed or unknown permission ids")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn update_role(
    State(state): State<AppState>,
    _auth: RequireRolesEdit,
    Path(id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::update_role(&state.db, id, dto).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(("id" = i64, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 403, description = "Forbidden - requires roles.delete"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn delete_role(
    State(state): State<AppState>,
    _auth: RequireRolesDelete,
    Path(id): Path<RoleId>,
) -> Result<StatusCode, AppError> {
    service::delete_role(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/roles/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Number of roles deleted", body = BulkDeleteResponse),
        (status = 403, description = "Forbidden - requires roles.delete")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn bulk_delete_roles(
    State(state): State<AppState>,
    _auth: RequireRolesDelete,
    Json(dto): Json<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = service::bulk_delete_roles(&state.db, &dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
