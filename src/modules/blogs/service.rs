use anyhow::anyhow;
use quillboard_core::errors::FieldErrors;
use quillboard_core::file_storage::{FileStorage, extension_for, validate_upload};
use quillboard_core::slug::{generate_slug, unique_slug};
use quillboard_core::{AppError, PageParams};
use quillboard_db::ordering::{self, OrderingError};
use quillboard_db::{ListQuery, Resource, is_foreign_key_violation, is_unique_violation, repository};
use quillboard_models::{
    Blog, BlogFilterParams, BlogId, BlogResponse, CategoryId, CityId, CountryId,
    PaginatedBlogsResponse, StateId, UpdateBlogDto, UserId,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::metrics::{
    track_blog_created, track_records_deleted, track_reorder, track_storage_delete_failure,
};

const FALLBACK_SLUG: &str = "blog";

pub fn list_query(params: BlogFilterParams) -> ListQuery {
    ListQuery::new(PageParams {
        page: params.page,
        per_page: params.per_page,
    })
    .search(params.search)
    .filter("status", params.status)
    .filter("category_id", params.category_id)
    .filter("priority", params.priority)
    .filter("is_featured", params.is_featured)
    .created_between(params.date_from, params.date_to)
    .sort(params.sort_by, params.sort_order)
}

pub fn to_response(storage: &dyn FileStorage, blog: Blog) -> BlogResponse {
    let image_url = blog.image.as_deref().and_then(|key| match storage.get_url(key) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(blog_id = %blog.id, error = %e, "Stored image key has no public URL");
            None
        }
    });
    BlogResponse { blog, image_url }
}

/// What the database says about the location a payload references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationFacts {
    pub country_exists: bool,
    /// Country of the referenced state, when the state exists.
    pub state_country: Option<CountryId>,
    /// State of the referenced city, when the city exists.
    pub city_state: Option<StateId>,
}

/// Field errors for a location whose links do not form a chain.
pub fn location_errors(
    country_id: Option<CountryId>,
    state_id: Option<StateId>,
    city_id: Option<CityId>,
    facts: LocationFacts,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if country_id.is_some() && !facts.country_exists {
        errors.insert("country_id".into(), "Selected country does not exist".into());
    }

    if state_id.is_some() {
        match facts.state_country {
            None => {
                errors.insert("state_id".into(), "Selected state does not exist".into());
            }
            Some(parent) if Some(parent) != country_id => {
                errors.insert(
                    "state_id".into(),
                    "Selected state does not belong to the selected country".into(),
                );
            }
            Some(_) => {}
        }
    }

    if city_id.is_some() {
        match facts.city_state {
            None => {
                errors.insert("city_id".into(), "Selected city does not exist".into());
            }
            Some(parent) if Some(parent) != state_id => {
                errors.insert(
                    "city_id".into(),
                    "Selected city does not belong to the selected state".into(),
                );
            }
            Some(_) => {}
        }
    }

    errors
}

async fn location_facts(db: &PgPool, dto: &UpdateBlogDto) -> Result<LocationFacts, sqlx::Error> {
    let country_exists = match dto.country_id {
        Some(id) => repository::exists(db, "countries", id.get()).await?,
        None => false,
    };

    let state_country = match dto.state_id {
        Some(id) => {
            sqlx::query_scalar::<_, CountryId>("SELECT country_id FROM states WHERE id = $1")
                .bind(id)
                .fetch_optional(db)
                .await?
        }
        None => None,
    };

    let city_state = match dto.city_id {
        Some(id) => {
            sqlx::query_scalar::<_, StateId>("SELECT state_id FROM cities WHERE id = $1")
                .bind(id)
                .fetch_optional(db)
                .await?
        }
        None => None,
    };

    Ok(LocationFacts {
        country_exists,
        state_country,
        city_state,
    })
}

/// Checks that the category and location a payload points at exist and
/// agree with each other. Returns the category id.
async fn check_references(db: &PgPool, dto: &UpdateBlogDto) -> Result<CategoryId, AppError> {
    let category_id = dto
        .category_id
        .ok_or_else(|| AppError::field("category_id", "Category is required"))?;

    let mut errors = location_errors(
        dto.country_id,
        dto.state_id,
        dto.city_id,
        location_facts(db, dto).await?,
    );

    if !repository::exists(db, "categories", category_id.get()).await? {
        errors.insert(
            "category_id".into(),
            "Selected category does not exist".into(),
        );
    }

    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    Ok(category_id)
}

/// A free slug derived from `title`, ignoring the blog being updated.
async fn free_slug(db: &PgPool, title: &str, exclude: Option<BlogId>) -> Result<String, sqlx::Error> {
    let base = match generate_slug(title) {
        s if s.is_empty() => FALLBACK_SLUG.to_string(),
        s => s,
    };

    let taken: Vec<String> = sqlx::query_scalar(
        "SELECT slug FROM blogs
         WHERE (slug = $1 OR slug LIKE $1 || '-%')
           AND ($2::BIGINT IS NULL OR id <> $2)",
    )
    .bind(&base)
    .bind(exclude)
    .fetch_all(db)
    .await?;

    Ok(unique_slug(&base, |candidate| taken.iter().any(|t| t == candidate)))
}

fn write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        return AppError::bad_request(anyhow!("A blog with this slug already exists"));
    }
    if is_foreign_key_violation(&err) {
        return AppError::field("category_id", "Selected category does not exist");
    }
    AppError::from(err)
}

async fn release_image(storage: &dyn FileStorage, blog_id: BlogId, key: &str) {
    if let Err(e) = storage.delete(key).await {
        warn!(blog_id = %blog_id, key, error = %e, "Failed to release stored image");
        track_storage_delete_failure();
    }
}

async fn find_blog(db: &PgPool, id: BlogId) -> Result<Blog, AppError> {
    repository::find::<Blog>(db, id.get())
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Blog not found")))
}

#[instrument(skip(db, storage))]
pub async fn get_blogs(
    db: &PgPool,
    storage: &dyn FileStorage,
    params: BlogFilterParams,
) -> Result<PaginatedBlogsResponse, AppError> {
    let page = repository::list::<Blog>(db, &list_query(params)).await?;
    let page = page.map(|blog| to_response(storage, blog));
    Ok(PaginatedBlogsResponse {
        data: page.data,
        meta: page.meta,
    })
}

#[instrument(skip(db, storage))]
pub async fn get_blog(
    db: &PgPool,
    storage: &dyn FileStorage,
    id: BlogId,
) -> Result<BlogResponse, AppError> {
    Ok(to_response(storage, find_blog(db, id).await?))
}

#[instrument(skip(db, storage, dto), fields(title = %dto.title))]
pub async fn create_blog(
    db: &PgPool,
    storage: &dyn FileStorage,
    author: UserId,
    dto: UpdateBlogDto,
) -> Result<BlogResponse, AppError> {
    let category_id = check_references(db, &dto).await?;
    let slug = free_slug(db, &dto.title, None).await?;
    let sort_order = ordering::next_sort_order::<Blog>(db).await?;

    let id = sqlx::query_scalar::<_, BlogId>(
        "INSERT INTO blogs (title, slug, content, status, tags, category_id, user_id, sort_order,
             country_id, state_id, city_id, priority, is_featured, skills, publish_date, is_active)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
         RETURNING id",
    )
    .bind(dto.title.trim())
    .bind(&slug)
    .bind(&dto.content)
    .bind(dto.status())
    .bind(&dto.tags)
    .bind(category_id)
    .bind(author)
    .bind(sort_order)
    .bind(dto.country_id)
    .bind(dto.state_id)
    .bind(dto.city_id)
    .bind(dto.priority())
    .bind(dto.is_featured)
    .bind(&dto.skills)
    .bind(dto.publish_date)
    .bind(dto.is_active)
    .fetch_one(db)
    .await
    .map_err(write_error)?;

    track_blog_created();
    info!(blog_id = %id, slug = %slug, sort_order, "Blog created");

    get_blog(db, storage, id).await
}

#[instrument(skip(db, storage, dto), fields(title = %dto.title))]
pub async fn update_blog(
    db: &PgPool,
    storage: &dyn FileStorage,
    id: BlogId,
    dto: UpdateBlogDto,
) -> Result<BlogResponse, AppError> {
    find_blog(db, id).await?;
    let category_id = check_references(db, &dto).await?;
    let slug = free_slug(db, &dto.title, Some(id)).await?;

    let updated = sqlx::query(
        "UPDATE blogs SET title = $1, slug = $2, content = $3, status = $4, tags = $5,
             category_id = $6, country_id = $7, state_id = $8, city_id = $9, priority = $10,
             is_featured = $11, skills = $12, publish_date = $13, is_active = $14,
             updated_at = NOW()
         WHERE id = $15",
    )
    .bind(dto.title.trim())
    .bind(&slug)
    .bind(&dto.content)
    .bind(dto.status())
    .bind(&dto.tags)
    .bind(category_id)
    .bind(dto.country_id)
    .bind(dto.state_id)
    .bind(dto.city_id)
    .bind(dto.priority())
    .bind(dto.is_featured)
    .bind(&dto.skills)
    .bind(dto.publish_date)
    .bind(dto.is_active)
    .bind(id)
    .execute(db)
    .await
    .map_err(write_error)?;

    if updated.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Blog not found")));
    }

    get_blog(db, storage, id).await
}

/// Releases the blog's image, then deletes the row. A failed release is
/// logged and the delete goes ahead.
#[instrument(skip(db, storage))]
pub async fn delete_blog(db: &PgPool, storage: &dyn FileStorage, id: BlogId) -> Result<(), AppError> {
    let blog = find_blog(db, id).await?;

    if let Some(key) = blog.image.as_deref() {
        release_image(storage, id, key).await;
    }

    if !repository::delete::<Blog>(db, id.get()).await? {
        return Err(AppError::not_found(anyhow!("Blog not found")));
    }
    track_records_deleted(Blog::TABLE, 1);
    Ok(())
}

/// Releases the images of every listed blog that exists, then deletes the
/// rows. Unknown ids are ignored.
#[instrument(skip(db, storage, ids), fields(ids.count = ids.len()))]
pub async fn bulk_delete_blogs(
    db: &PgPool,
    storage: &dyn FileStorage,
    ids: &[i64],
) -> Result<u64, AppError> {
    if ids.is_empty() {
        return Ok(0);
    }

    let images: Vec<(BlogId, String)> = sqlx::query_as(
        "SELECT id, image FROM blogs WHERE id = ANY($1) AND image IS NOT NULL",
    )
    .bind(ids)
    .fetch_all(db)
    .await?;

    for (id, key) in &images {
        release_image(storage, *id, key).await;
    }

    let deleted = repository::bulk_delete::<Blog>(db, ids).await?;
    track_records_deleted(Blog::TABLE, deleted);

    info!(requested = ids.len(), deleted, "Bulk deleted blogs");
    Ok(deleted)
}

/// Stores a new cover image, points the blog at it and releases the old one.
#[instrument(skip(db, storage, content), fields(size = content.len()))]
pub async fn upload_image(
    db: &PgPool,
    storage: &dyn FileStorage,
    id: BlogId,
    content_type: &str,
    content: &[u8],
) -> Result<BlogResponse, AppError> {
    validate_upload(content_type, content.len(), storage.max_file_size())
        .map_err(|e| AppError::field("image", e.to_string()))?;

    let blog = find_blog(db, id).await?;

    let key = format!(
        "blogs/{}.{}",
        uuid::Uuid::new_v4().simple(),
        extension_for(content_type)
    );
    let key = storage.save(&key, content).await.map_err(|e| {
        if e.is_client_error() {
            AppError::field("image", e.to_string())
        } else {
            AppError::internal(e)
        }
    })?;

    let result = sqlx::query("UPDATE blogs SET image = $1, updated_at = NOW() WHERE id = $2")
        .bind(&key)
        .bind(id)
        .execute(db)
        .await;

    if let Err(e) = result {
        release_image(storage, id, &key).await;
        return Err(e.into());
    }

    if let Some(previous) = blog.image.as_deref() {
        release_image(storage, id, previous).await;
    }

    get_blog(db, storage, id).await
}

fn ordering_error(err: OrderingError) -> AppError {
    match err {
        OrderingError::InvalidIndex { .. }
        | OrderingError::DuplicateId(_)
        | OrderingError::TooMany(_) => AppError::bad_request(err),
        OrderingError::Database(e) => AppError::from(e),
    }
}

#[instrument(skip(db, ordered_ids), fields(ids.count = ordered_ids.len()))]
pub async fn reorder_blogs(db: &PgPool, ordered_ids: &[BlogId]) -> Result<u64, AppError> {
    let ids: Vec<i64> = ordered_ids.iter().map(|id| id.get()).collect();
    let updated = ordering::reorder_by_full_sequence::<Blog>(db, &ids)
        .await
        .map_err(ordering_error)?;
    track_reorder(Blog::TABLE, "sequence");
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn move_blog(db: &PgPool, from_index: usize, to_index: usize) -> Result<(), AppError> {
    ordering::move_by_index::<Blog>(db, from_index, to_index)
        .await
        .map_err(ordering_error)?;
    track_reorder(Blog::TABLE, "move");
    Ok(())
}

#[instrument(skip(db))]
pub async fn reset_blog_order(db: &PgPool) -> Result<u64, AppError> {
    let renumbered = ordering::reset_order::<Blog>(db)
        .await
        .map_err(ordering_error)?;
    track_reorder(Blog::TABLE, "reset");
    Ok(renumbered)
}

pub const CSV_HEADERS: &[&str] = &[
    "ID",
    "Title",
    "Slug",
    "Status",
    "Priority",
    "Category",
    "Author",
    "Country",
    "State",
    "City",
    "Tags",
    "Skills",
    "Featured",
    "Active",
    "Publish Date",
    "Order",
    "Created At",
];

pub fn write_csv(blogs: &[Blog]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for blog in blogs {
        writer.write_record([
            blog.id.to_string(),
            blog.title.clone(),
            blog.slug.clone(),
            blog.status.to_string(),
            blog.priority.to_string(),
            blog.category_name.clone().unwrap_or_default(),
            blog.author_name.clone().unwrap_or_default(),
            blog.country_name.clone().unwrap_or_default(),
            blog.state_name.clone().unwrap_or_default(),
            blog.city_name.clone().unwrap_or_default(),
            blog.tags.join(", "),
            blog.skills.join(", "),
            yes_no(blog.is_featured).to_string(),
            yes_no(blog.is_active).to_string(),
            blog.publish_date.map(|d| d.to_string()).unwrap_or_default(),
            blog.sort_order.to_string(),
            blog.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Every blog matching the filters, in list order, as CSV.
#[instrument(skip(db))]
pub async fn export_blogs(db: &PgPool, params: BlogFilterParams) -> Result<Vec<u8>, AppError> {
    let blogs = repository::list_all::<Blog>(db, &list_query(params)).await?;
    info!(rows = blogs.len(), "Exporting blogs");
    write_csv(&blogs).map_err(AppError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quillboard_core::file_storage::LocalFileStorage;
    use quillboard_models::{BlogStatus, Priority};
    use std::path::PathBuf;

    fn blog(id: i64, image: Option<&str>) -> Blog {
        Blog {
            id: BlogId(id),
            title: "Product launch recap".into(),
            slug: "product-launch-recap".into(),
            content: "Body".into(),
            image: image.map(str::to_string),
            status: BlogStatus::Published,
            tags: vec!["launch".into(), "news".into()],
            category_id: CategoryId(2),
            user_id: UserId(1),
            sort_order: 3,
            country_id: None,
            state_id: None,
            city_id: None,
            priority: Priority::High,
            is_featured: true,
            skills: vec![],
            publish_date: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            category_name: Some("Technology".into()),
            author_name: Some("Editor".into()),
            country_name: None,
            state_name: None,
            city_name: None,
        }
    }

    fn storage() -> LocalFileStorage {
        LocalFileStorage::new(PathBuf::from("/tmp/unused"), "http://cdn.test/storage/".into())
    }

    #[test]
    fn test_list_query_maps_filters() {
        let params: BlogFilterParams = serde_json::from_value(serde_json::json!({
            "search": "launch",
            "status": "published",
            "category_id": "2",
            "is_featured": "1",
            "sort_by": "title",
            "sort_order": "ASC",
            "page": "2",
            "per_page": "5"
        }))
        .unwrap();
        let query = list_query(params);
        assert_eq!(query.search.as_deref(), Some("launch"));
        assert_eq!(query.filters.len(), 3);
        assert_eq!(query.page.offset(), 5);
        assert_eq!(query.sort_by.as_deref(), Some("title"));
    }

    #[test]
    fn test_response_resolves_image_url() {
        let response = to_response(&storage(), blog(1, Some("blogs/a.png")));
        assert_eq!(
            response.image_url.as_deref(),
            Some("http://cdn.test/storage/blogs/a.png")
        );
        assert!(to_response(&storage(), blog(2, None)).image_url.is_none());
    }

    #[test]
    fn test_location_chain_accepts_consistent_links() {
        let facts = LocationFacts {
            country_exists: true,
            state_country: Some(CountryId(1)),
            city_state: Some(StateId(10)),
        };
        let errors = location_errors(Some(CountryId(1)), Some(StateId(10)), Some(CityId(100)), facts);
        assert!(errors.is_empty());
        assert!(location_errors(None, None, None, LocationFacts::default()).is_empty());
    }

    #[test]
    fn test_location_chain_rejects_foreign_state() {
        let facts = LocationFacts {
            country_exists: true,
            state_country: Some(CountryId(2)),
            city_state: Some(StateId(10)),
        };
        let errors = location_errors(Some(CountryId(1)), Some(StateId(10)), Some(CityId(100)), facts);
        assert_eq!(
            errors.get("state_id").map(String::as_str),
            Some("Selected state does not belong to the selected country")
        );
        assert!(!errors.contains_key("city_id"));
    }

    #[test]
    fn test_location_chain_rejects_missing_records() {
        let errors = location_errors(
            Some(CountryId(9)),
            Some(StateId(10)),
            Some(CityId(100)),
            LocationFacts::default(),
        );
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["city_id"], "Selected city does not exist");
    }

    #[test]
    fn test_city_without_state_is_rejected() {
        let facts = LocationFacts {
            country_exists: true,
            state_country: None,
            city_state: Some(StateId(10)),
        };
        let errors = location_errors(Some(CountryId(1)), None, Some(CityId(100)), facts);
        assert_eq!(
            errors["city_id"],
            "Selected city does not belong to the selected state"
        );
    }

    #[test]
    fn test_csv_export_layout() {
        let bytes = write_csv(&[blog(4, None)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("ID,Title,Slug,Status"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("4,Product launch recap,product-launch-recap,published,high,Technology"));
        assert!(row.contains("\"launch, news\""));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_ordering_errors_are_client_errors() {
        let err = ordering_error(OrderingError::InvalidIndex { index: 9, len: 3 });
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Invalid index");

        let err = ordering_error(OrderingError::TooMany(usize::MAX));
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
