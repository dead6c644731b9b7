use axum::{Json, extract::State};
use quillboard_core::AppError;
use quillboard_models::Category;

use super::service;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Active categories ordered by name", body = Vec<Category>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lookups",
    security(("bearer_auth" = []))
)]
pub async fn get_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = service::get_active_categories(&state.db).await?;
    Ok(Json(categories))
}
