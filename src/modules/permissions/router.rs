use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{
    bulk_delete_permissions, create_permission, delete_permission, get_permission,
    get_permission_modules, get_permissions, update_permission,
};
use crate::state::AppState;

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_permissions).post(create_permission))
        .route("/modules", get(get_permission_modules))
        .route("/bulk-delete", post(bulk_delete_permissions))
        .route(
            "/{id}",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
}
