use quillboard_core::AppError;
use quillboard_models::{CountryId, OptionItem, StateId};
use sqlx::PgPool;
use tracing::instrument;

#[instrument(skip(db))]
pub async fn get_countries(db: &PgPool) -> Result<Vec<OptionItem>, AppError> {
    let countries = sqlx::query_as::<_, OptionItem>("SELECT id, name FROM countries ORDER BY name")
        .fetch_all(db)
        .await?;
    Ok(countries)
}

#[instrument(skip(db))]
pub async fn get_states(db: &PgPool, country_id: CountryId) -> Result<Vec<OptionItem>, AppError> {
    let states = sqlx::query_as::<_, OptionItem>(
        "SELECT id, name FROM states WHERE country_id = $1 ORDER BY name",
    )
    .bind(country_id)
    .fetch_all(db)
    .await?;
    Ok(states)
}

#[instrument(skip(db))]
pub async fn get_cities(db: &PgPool, state_id: StateId) -> Result<Vec<OptionItem>, AppError> {
    let cities = sqlx::query_as::<_, OptionItem>(
        "SELECT id, name FROM cities WHERE state_id = $1 ORDER BY name",
    )
    .bind(state_id)
    .fetch_all(db)
    .await?;
    Ok(cities)
}
