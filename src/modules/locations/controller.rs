use axum::{
    Json,
    extract::{Path, State},
};
use quillboard_core::AppError;
use quillboard_models::{CountryId, OptionItem, StateId};

use super::service;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/countries",
    responses(
        (status = 200, description = "Countries ordered by name", body = Vec<OptionItem>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lookups",
    security(("bearer_auth" = []))
)]
pub async fn get_countries(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<OptionItem>>, AppError> {
    Ok(Json(service::get_countries(&state.db).await?))
}

#[utoipa::path(
    get,
    path = "/api/countries/{id}/states",
    params(("id" = i64, Path, description = "Country ID")),
    responses(
        (status = 200, description = "States of the country; empty for an unknown country", body = Vec<OptionItem>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lookups",
    security(("bearer_auth" = []))
)]
pub async fn get_states(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(country_id): Path<CountryId>,
) -> Result<Json<Vec<OptionItem>>, AppError> {
    Ok(Json(service::get_states(&state.db, country_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/states/{id}/cities",
    params(("id" = i64, Path, description = "State ID")),
    responses(
        (status = 200, description = "Cities of the state; empty for an unknown state", body = Vec<OptionItem>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Lookups",
    security(("bearer_auth" = []))
)]
pub async fn get_cities(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(state_id): Path<StateId>,
) -> Result<Json<Vec<OptionItem>>, AppError> {
    Ok(Json(service::get_cities(&state.db, state_id).await?))
}
