use quillboard_core::AppError;
use quillboard_models::{CourseId, OptionItem};
use sqlx::PgPool;
use tracing::instrument;

#[instrument(skip(db))]
pub async fn get_courses(db: &PgPool) -> Result<Vec<OptionItem>, AppError> {
    let courses = sqlx::query_as::<_, OptionItem>("SELECT id, name FROM courses ORDER BY name")
        .fetch_all(db)
        .await?;
    Ok(courses)
}

/// Subjects of one course; an unknown course has none.
#[instrument(skip(db))]
pub async fn get_subjects(db: &PgPool, course_id: CourseId) -> Result<Vec<OptionItem>, AppError> {
    let subjects = sqlx::query_as::<_, OptionItem>(
        "SELECT id, name FROM subjects WHERE course_id = $1 ORDER BY name",
    )
    .bind(course_id)
    .fetch_all(db)
    .await?;
    Ok(subjects)
}
