use dotenvy::dotenv;
use quillboard::logging::init_tracing;
use quillboard::metrics::{init_metrics, metrics_app};
use quillboard::router::init_router;
use quillboard::state::AppState;
use quillboard_config::{DatabaseConfig, ServerConfig};
use quillboard_db::init_db_pool;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let server = ServerConfig::from_env();
    let database = DatabaseConfig::from_env()
        .map_err(|e| anyhow::anyhow!("DATABASE_URL must be set: {}", e))?;

    let pool = init_db_pool(&database).await?;
    let state = AppState::from_env(pool);
    let mut app = init_router(state);

    if let Some(handle) = init_metrics(server.metrics_enabled)? {
        app = app.merge(metrics_app(handle));
    }

    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("🚀 Server running on http://{}", address);
    info!("📚 Swagger UI available at http://{}/swagger-ui", address);
    info!("📖 Scalar UI available at http://{}/scalar", address);
    if server.metrics_enabled {
        info!("📈 Metrics available at http://{}/metrics", address);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
