use axum::{Router, routing::get};

use super::controller::{get_cities, get_countries, get_states};
use crate::state::AppState;

/// Mounted at the API root: `/countries`, `/countries/{id}/states` and
/// `/states/{id}/cities`.
pub fn init_locations_router() -> Router<AppState> {
    Router::new()
        .route("/countries", get(get_countries))
        .route("/countries/{id}/states", get(get_states))
        .route("/states/{id}/cities", get(get_cities))
}
