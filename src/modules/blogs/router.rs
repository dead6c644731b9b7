use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use super::controller::{
    bulk_delete_blogs, create_blog, delete_blog, export_blogs, get_blog, get_blogs, move_blog,
    reorder_blogs, reset_blog_order, update_blog, upload_image,
};
use crate::state::AppState;

// Multipart framing adds a little on top of the largest accepted image.
const UPLOAD_BODY_SLACK: usize = 64 * 1024;

pub fn init_blogs_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(get_blogs).post(create_blog))
        .route("/export", get(export_blogs))
        .route("/bulk-delete", post(bulk_delete_blogs))
        .route("/reorder", post(reorder_blogs))
        .route("/reorder/move", post(move_blog))
        .route("/reorder/reset", post(reset_blog_order))
        .route(
            "/{id}",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
        .route(
            "/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes + UPLOAD_BODY_SLACK)),
        )
}
