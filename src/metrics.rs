use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static METRICS_ENABLED: OnceLock<bool> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Whether metrics are recorded. Fixed by the first call to [`init_metrics`];
/// enabled when never initialised so tests record into the no-op recorder.
pub fn is_metrics_enabled() -> bool {
    *METRICS_ENABLED.get_or_init(|| true)
}

/// Installs the Prometheus recorder and its upkeep task.
/// Returns `Ok(None)` when metrics are disabled.
pub fn init_metrics(enabled: bool) -> Result<Option<PrometheusHandle>, BuildError> {
    let enabled = *METRICS_ENABLED.get_or_init(|| enabled);
    if !enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_metrics_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Domain counters

pub fn track_blog_created() {
    if !is_metrics_enabled() {
        return;
    }
    counter!("blogs_created_total").increment(1);
}

pub fn track_records_deleted(resource: &'static str, count: u64) {
    if !is_metrics_enabled() || count == 0 {
        return;
    }
    counter!("records_deleted_total", "resource" => resource).increment(count);
}

/// `kind` is one of `sequence`, `move`, `reset`.
pub fn track_reorder(resource: &'static str, kind: &'static str) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("reorder_operations_total", "resource" => resource, "kind" => kind).increment(1);
}

pub fn track_storage_delete_failure() {
    if !is_metrics_enabled() {
        return;
    }
    counter!("storage_delete_failures_total").increment(1);
}

pub fn track_login(success: bool) {
    if !is_metrics_enabled() {
        return;
    }
    let status = if success { "success" } else { "failure" };
    counter!("user_logins_total", "status" => status).increment(1);
}
