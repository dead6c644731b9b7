use axum::{Router, routing::get};

use super::controller::get_categories;
use crate::state::AppState;

pub fn init_categories_router() -> Router<AppState> {
    Router::new().route("/", get(get_categories))
}
