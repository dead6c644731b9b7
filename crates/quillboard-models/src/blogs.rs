//! Blog domain models and DTOs.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use quillboard_core::PageMeta;
use quillboard_core::serde::{
    deserialize_optional_bool, deserialize_optional_date, deserialize_optional_i64,
    deserialize_optional_id, deserialize_optional_string,
};
use quillboard_db::{Orderable, Resource};
use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, FromRow, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::ids::{BlogId, CategoryId, CityId, CountryId, StateId, UserId};

pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_LENGTH: usize = 50;

/// Defines a closed set of lowercase string values stored in a `TEXT` column.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(format!("invalid {}: {}", stringify!($name), other)),
                }
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
                raw.parse::<$name>().map_err(Into::into)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <String as PgHasArrayType>::array_type_info()
            }
        }
    };
}

text_enum!(
    /// Publication state of a blog.
    BlogStatus {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
);

text_enum!(
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

/// A blog row joined with the display names of its references.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub slug: String,
    pub content: String,
    /// Storage key of the cover image.
    pub image: Option<String>,
    pub status: BlogStatus,
    pub tags: Vec<String>,
    pub category_id: CategoryId,
    pub user_id: UserId,
    pub sort_order: i32,
    pub country_id: Option<CountryId>,
    pub state_id: Option<StateId>,
    pub city_id: Option<CityId>,
    pub priority: Priority,
    pub is_featured: bool,
    pub skills: Vec<String>,
    pub publish_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub author_name: Option<String>,
    pub country_name: Option<String>,
    pub state_name: Option<String>,
    pub city_name: Option<String>,
}

impl Resource for Blog {
    const TABLE: &'static str = "blogs";
    const ALIAS: &'static str = "b";
    const COLUMNS: &'static str = "b.*, c.name AS category_name, u.name AS author_name, \
        co.name AS country_name, st.name AS state_name, ci.name AS city_name";
    const JOINS: &'static str = "LEFT JOIN categories c ON c.id = b.category_id \
        LEFT JOIN users u ON u.id = b.user_id \
        LEFT JOIN countries co ON co.id = b.country_id \
        LEFT JOIN states st ON st.id = b.state_id \
        LEFT JOIN cities ci ON ci.id = b.city_id";
    const SEARCH_COLUMNS: &'static [&'static str] = &["title"];
    const FILTER_COLUMNS: &'static [&'static str] =
        &["status", "category_id", "priority", "is_featured", "is_active"];
    const SORTABLE: &'static [&'static str] = &[
        "title",
        "status",
        "priority",
        "publish_date",
        "created_at",
        "updated_at",
    ];
    const ORDERED: bool = true;
}

impl Orderable for Blog {}

/// A blog as returned by the API, with the image resolved to a URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogResponse {
    #[serde(flatten)]
    pub blog: Blog,
    pub image_url: Option<String>,
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(message("required", "Title is required"));
    }
    if !(5..=255).contains(&len) {
        return Err(message("length", "Title must be between 5 and 255 characters"));
    }
    Ok(())
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<BlogStatus>()
        .map(|_| ())
        .map_err(|_| message("status", "Status must be one of draft, published, archived"))
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Priority>()
        .map(|_| ())
        .map_err(|_| message("priority", "Priority must be one of low, medium, high"))
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(message("tags", "Maximum 10 tags allowed"));
    }
    validate_labels(tags)
}

fn validate_labels(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.chars().count() > MAX_TAG_LENGTH) {
        return Err(message("length", "Each entry must not exceed 50 characters"));
    }
    Ok(())
}

fn message(code: &'static str, text: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(text))
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBlogDto {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(custom(function = "validate_status"))]
    #[schema(example = "draft")]
    pub status: String,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[validate(required(message = "Category is required"))]
    #[schema(value_type = i64)]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[schema(value_type = Option<i64>)]
    pub country_id: Option<CountryId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[schema(value_type = Option<i64>)]
    pub state_id: Option<StateId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[schema(value_type = Option<i64>)]
    pub city_id: Option<CityId>,
    #[validate(custom(function = "validate_priority"))]
    #[schema(example = "medium")]
    pub priority: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    #[validate(custom(function = "validate_labels"))]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub publish_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Updates replace every editable field.
pub type UpdateBlogDto = CreateBlogDto;

fn default_true() -> bool {
    true
}

impl CreateBlogDto {
    pub fn status(&self) -> BlogStatus {
        self.status.parse().unwrap_or(BlogStatus::Draft)
    }

    pub fn priority(&self) -> Priority {
        self.priority.parse().unwrap_or(Priority::Medium)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogFilterParams {
    /// Case-insensitive substring of the title
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_featured: Option<bool>,
    /// Inclusive, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    /// Inclusive, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sort_order: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedBlogsResponse {
    pub data: Vec<BlogResponse>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderBlogsDto {
    /// Ids in their new display order
    pub ordered_ids: Vec<BlogId>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveBlogDto {
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportParams {
    /// `csv`; `xlsx` and `pdf` are not served here
    pub format: Option<String>,
}
