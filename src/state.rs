use std::sync::Arc;

use quillboard_config::{CorsConfig, JwtConfig, StorageConfig};
use quillboard_core::file_storage::{FileStorage, LocalFileStorage};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub storage_config: StorageConfig,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// State over an existing pool, with every other setting read from the
    /// environment.
    pub fn from_env(db: PgPool) -> Self {
        Self::new(
            db,
            JwtConfig::from_env(),
            CorsConfig::from_env(),
            StorageConfig::from_env(),
        )
    }

    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        storage_config: StorageConfig,
    ) -> Self {
        let storage = LocalFileStorage::with_max_size(
            storage_config.dir.clone(),
            storage_config.base_url.clone(),
            storage_config.max_upload_bytes,
        );

        Self {
            db,
            jwt_config,
            cors_config,
            storage_config,
            storage: Arc::new(storage),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("jwt_config", &"<redacted>")
            .field("cors_config", &self.cors_config)
            .field("storage_config", &self.storage_config)
            .finish_non_exhaustive()
    }
}
