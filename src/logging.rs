use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_DIR: &str = "storage/logs";
pub const DEFAULT_FILTER: &str = "quillboard=info,tower_http=warn,sqlx=warn";

/// Logs each request once on arrival and once on completion, at a level
/// chosen by the response status class.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %matched_path,
        "Incoming request"
    );

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms = %latency_ms,
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms = %latency_ms,
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %matched_path,
            status,
            latency_ms = %latency_ms,
            "Request completed"
        ),
    }

    response
}

/// Console output filtered by `RUST_LOG`, an error-only plain file and a
/// JSON file for ingestion. Both files roll daily under [`LOG_DIR`].
pub fn init_tracing() {
    let file_layers = match std::fs::create_dir_all(LOG_DIR) {
        Ok(()) => {
            let error_file = fmt::layer()
                .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "quillboard.log"))
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_filter(EnvFilter::new("error"));

            let json_file = fmt::layer()
                .json()
                .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "quillboard.json"))
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(EnvFilter::new("info"));

            Some(error_file.and_then(json_file))
        }
        Err(e) => {
            eprintln!("⚠️  Cannot create {}: {}. Logging to console only.", LOG_DIR, e);
            None
        }
    };

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layers)
        .init();
}
