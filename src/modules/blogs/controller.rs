use anyhow::anyhow;
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use quillboard_core::AppError;
use quillboard_models::{
    BlogFilterParams, BlogId, BlogResponse, BulkDeleteDto, BulkDeleteResponse, CreateBlogDto,
    ExportParams, MessageResponse, MoveBlogDto, PaginatedBlogsResponse, ReorderBlogsDto,
    UpdateBlogDto, UserId,
};
use tracing::instrument;

use super::service;
use crate::middleware::auth::{
    RequireBlogsCreate, RequireBlogsDelete, RequireBlogsEdit, RequireBlogsView,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/blogs",
    params(BlogFilterParams),
    responses(
        (status = 200, description = "Page of blogs in display order", body = PaginatedBlogsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires blogs.view")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_blogs(
    State(state): State<AppState>,
    _auth: RequireBlogsView,
    Query(params): Query<BlogFilterParams>,
) -> Result<Json<PaginatedBlogsResponse>, AppError> {
    let page = service::get_blogs(&state.db, state.storage.as_ref(), params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(("id" = i64, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog details", body = BlogResponse),
        (status = 403, description = "Forbidden - requires blogs.view"),
        (status = 404, description = "Blog not found")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
pub async fn get_blog(
    State(state): State<AppState>,
    _auth: RequireBlogsView,
    Path(id): Path<BlogId>,
) -> Result<Json<BlogResponse>, AppError> {
    let blog = service::get_blog(&state.db, state.storage.as_ref(), id).await?;
    Ok(Json(blog))
}

#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = CreateBlogDto,
    responses(
        (status = 201, description = "Blog created at the end of the order", body = BlogResponse),
        (status = 403, description = "Forbidden - requires blogs.create"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_blog(
    State(state): State<AppState>,
    RequireBlogsCreate(auth_user): RequireBlogsCreate,
    ValidatedJson(dto): ValidatedJson<CreateBlogDto>,
) -> Result<(StatusCode, Json<BlogResponse>), AppError> {
    let author = UserId::new(auth_user.user_id());
    let blog = service::create_blog(&state.db, state.storage.as_ref(), author, dto).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(("id" = i64, Path, description = "Blog ID")),
    request_body = UpdateBlogDto,
    responses(
        (status = 200, description = "Blog updated", body = BlogResponse),
        (status = 403, description = "Forbidden - requires blogs.edit"),
        (status = 404, description = "Blog not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn update_blog(
    State(state): State<AppState>,
    _auth: RequireBlogsEdit,
    Path(id): Path<BlogId>,
    ValidatedJson(dto): ValidatedJson<UpdateBlogDto>,
) -> Result<Json<BlogResponse>, AppError> {
    let blog = service::update_blog(&state.db, state.storage.as_ref(), id, dto).await?;
    Ok(Json(blog))
}

#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(("id" = i64, Path, description = "Blog ID")),
    responses(
        (status = 204, description = "Blog deleted"),
        (status = 403, description = "Forbidden - requires blogs.delete"),
        (status = 404, description = "Blog not found")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn delete_blog(
    State(state): State<AppState>,
    _auth: RequireBlogsDelete,
    Path(id): Path<BlogId>,
) -> Result<StatusCode, AppError> {
    service::delete_blog(&state.db, state.storage.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/blogs/bulk-delete",
    request_body = BulkDeleteDto,
    responses(
        (status = 200, description = "Number of blogs deleted; unknown ids are ignored", body = BulkDeleteResponse),
        (status = 403, description = "Forbidden - requires blogs.delete")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn bulk_delete_blogs(
    State(state): State<AppState>,
    _auth: RequireBlogsDelete,
    Json(dto): Json<BulkDeleteDto>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let deleted = service::bulk_delete_blogs(&state.db, state.storage.as_ref(), &dto.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// Replace the cover image
///
/// Multipart body with one `image` part: jpeg, png, gif or webp, at most 2 MB.
#[utoipa::path(
    post,
    path = "/api/blogs/{id}/image",
    params(("id" = i64, Path, description = "Blog ID")),
    request_body(content_type = "multipart/form-data", description = "Part named `image`"),
    responses(
        (status = 200, description = "Image stored", body = BlogResponse),
        (status = 403, description = "Forbidden - requires blogs.edit"),
        (status = 404, description = "Blog not found"),
        (status = 422, description = "Missing image, unsupported type or too large")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    _auth: RequireBlogsEdit,
    Path(id): Path<BlogId>,
    mut multipart: Multipart,
) -> Result<Json<BlogResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e.body_text())))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::field("image", e.body_text()))?;

        let blog =
            service::upload_image(&state.db, state.storage.as_ref(), id, &content_type, &bytes)
                .await?;
        return Ok(Json(blog));
    }

    Err(AppError::field("image", "Image is required"))
}

#[utoipa::path(
    post,
    path = "/api/blogs/reorder",
    request_body = ReorderBlogsDto,
    responses(
        (status = 200, description = "Listed blogs renumbered 1..n", body = MessageResponse),
        (status = 400, description = "Duplicate id"),
        (status = 403, description = "Forbidden - requires blogs.edit")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, dto))]
pub async fn reorder_blogs(
    State(state): State<AppState>,
    _auth: RequireBlogsEdit,
    Json(dto): Json<ReorderBlogsDto>,
) -> Result<Json<MessageResponse>, AppError> {
    service::reorder_blogs(&state.db, &dto.ordered_ids).await?;
    Ok(Json(MessageResponse {
        message: "Order updated successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/blogs/reorder/move",
    request_body = MoveBlogDto,
    responses(
        (status = 200, description = "Blog moved and all blogs renumbered", body = MessageResponse),
        (status = 400, description = "Invalid index"),
        (status = 403, description = "Forbidden - requires blogs.edit")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn move_blog(
    State(state): State<AppState>,
    _auth: RequireBlogsEdit,
    Json(dto): Json<MoveBlogDto>,
) -> Result<Json<MessageResponse>, AppError> {
    service::move_blog(&state.db, dto.from_index, dto.to_index).await?;
    Ok(Json(MessageResponse {
        message: "Blog moved successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/blogs/reorder/reset",
    responses(
        (status = 200, description = "Order reset to creation order", body = MessageResponse),
        (status = 403, description = "Forbidden - requires blogs.edit")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn reset_blog_order(
    State(state): State<AppState>,
    _auth: RequireBlogsEdit,
) -> Result<Json<MessageResponse>, AppError> {
    service::reset_blog_order(&state.db).await?;
    Ok(Json(MessageResponse {
        message: "Order reset successfully".to_string(),
    }))
}

/// Export the filtered list
///
/// Every matching blog across all pages. Only `csv` is produced here.
#[utoipa::path(
    get,
    path = "/api/blogs/export",
    params(BlogFilterParams, ExportParams),
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv"),
        (status = 400, description = "Unsupported format"),
        (status = 403, description = "Forbidden - requires blogs.view")
    ),
    tag = "Blogs",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn export_blogs(
    State(state): State<AppState>,
    _auth: RequireBlogsView,
    Query(export): Query<ExportParams>,
    Query(params): Query<BlogFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let format = export.format.as_deref().unwrap_or("csv").trim().to_ascii_lowercase();
    if format != "csv" {
        return Err(AppError::bad_request(anyhow!(
            "Export format '{}' is not supported here; use csv",
            format
        )));
    }

    let body = service::export_blogs(&state.db, params).await?;
    let filename = format!("blogs-{}.csv", Utc::now().format("%Y%m%d-%H%M%S"));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    ))
}
