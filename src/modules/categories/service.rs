use quillboard_core::AppError;
use quillboard_models::Category;
use sqlx::PgPool;
use tracing::instrument;

#[instrument(skip(db))]
pub async fn get_active_categories(db: &PgPool) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE is_active = TRUE ORDER BY name",
    )
    .fetch_all(db)
    .await?;
    Ok(categories)
}
