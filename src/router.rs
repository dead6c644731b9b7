use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::auth::init_auth_router;
use crate::modules::blogs::init_blogs_router;
use crate::modules::categories::init_categories_router;
use crate::modules::courses::init_courses_router;
use crate::modules::locations::init_locations_router;
use crate::modules::permissions::init_permissions_router;
use crate::modules::roles::init_roles_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    let max_upload_bytes = state.storage_config.max_upload_bytes;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest_service("/storage", ServeDir::new(&state.storage_config.dir))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest("/blogs", init_blogs_router(max_upload_bytes))
                .nest("/roles", init_roles_router())
                .nest("/permissions", init_permissions_router())
                .nest("/categories", init_categories_router())
                .nest("/courses", init_courses_router())
                .merge(init_locations_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
