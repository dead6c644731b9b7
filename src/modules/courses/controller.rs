use axum::{
    Json,
    extract::{Path, State},
};
use quillboard_core::AppError;
use quillboard_models::{CourseId, OptionItem};

use super::service;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Courses ordered by name", body = Vec<OptionItem>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lookups",
    security(("bearer_auth" = []))
)]
pub async fn get_courses(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<OptionItem>>, AppError> {
    Ok(Json(service::get_courses(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/subjects",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Subjects of the course ordered by name", body = Vec<OptionItem>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lookups",
    security(("bearer_auth" = []))
)]
pub async fn get_subjects(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Vec<OptionItem>>, AppError> {
    Ok(Json(service::get_subjects(&state.db, course_id).await?))
}
