use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    bulk_delete_roles, create_role, delete_role, get_role, get_roles, update_role,
};
use crate::state::AppState;

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_roles).post(create_role))
        .route("/bulk-delete", post(bulk_delete_roles))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
}
